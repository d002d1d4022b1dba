//! SQLite connection helpers.
//!
//! [`connect_sqlite`] opens the warehouse database and applies
//! [`CONNECTION_PRAGMAS`] before handing the connection out. Sync runs may
//! hold a connection for minutes, so the busy timeout matters more here
//! than in a typical web service.
//!
//! Example:
//! ```no_run
//! use seller_sync::db::connection::connect_sqlite;
//!
//! let path = std::env::temp_dir().join("seller_sync_example.db");
//! let _conn = connect_sqlite(path.to_str().unwrap()).expect("open database");
//! ```

use diesel::connection::SimpleConnection;
use diesel::{Connection, SqliteConnection};

/// Applied to every connection: WAL journaling, enforced foreign keys,
/// and a 5000ms busy timeout.
pub const CONNECTION_PRAGMAS: &str = "\
    PRAGMA journal_mode=WAL;\
    PRAGMA foreign_keys=ON;\
    PRAGMA busy_timeout=5000;";

/// Open a SQLite connection with the connection-wide PRAGMAs applied.
pub fn connect_sqlite(database_url: &str) -> anyhow::Result<SqliteConnection> {
    let mut conn = SqliteConnection::establish(database_url)?;
    conn.batch_execute(CONNECTION_PRAGMAS)?;
    Ok(conn)
}
