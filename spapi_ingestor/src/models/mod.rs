//! Typed payload models for the remote API families.
//!
//! Field names mirror the wire format of each family: the orders and FBA
//! inbound APIs use PascalCase keys with string money amounts, the AWD and
//! inventory APIs use camelCase, and report documents are tab-delimited text
//! keyed by a header row.

pub mod catalog;
pub mod fees;
pub mod inbound;
pub mod inventory;
pub mod ledger;
pub mod listings;
pub mod orders;
pub mod reports;
pub mod sellers;
