//! Warehouse database access.
//!
//! Two pieces:
//! - [`connection::connect_sqlite`] opens a tuned connection (WAL,
//!   foreign_keys=ON, 5000ms busy_timeout).
//! - [`migrate::run`] applies the embedded Diesel migrations to a database
//!   file (bare file paths are accepted).
//!
//! Example:
//! ```no_run
//! use seller_sync::db::{connection, migrate};
//!
//! let db_path = std::env::temp_dir().join("seller_sync_example.db");
//! migrate::run(db_path.to_str().unwrap()).expect("migrations");
//! let _conn = connection::connect_sqlite(db_path.to_str().unwrap()).expect("open database");
//! ```

pub mod connection;
pub mod migrate;
