//! Warehouse sync for Amazon seller accounts: inventory, inbound
//! shipments, orders, and fees land in a local SQLite warehouse as
//! products, stock levels, transfers, and sale orders.

#![deny(missing_docs)]

pub mod accounts;
pub mod addresses;
pub mod db;
pub mod ledger;
pub mod models;
pub mod overview;
pub mod policy;
pub mod reconcile;
pub mod registry;
#[allow(missing_docs)]
pub mod schema;
pub mod stock;
pub mod sync;
