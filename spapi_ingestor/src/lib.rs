//! Client crate for the Amazon Selling Partner API surface used by the
//! seller sync engine.
//!
//! The [`providers::SellerApi`] trait is the seam between the sync engine and
//! the remote API: one async method per remote concern (listings, catalog,
//! inventory summaries, inbound shipments, orders, fee estimates, the
//! inventory ledger report). [`providers::sp_rest::SpRestClient`] is the REST
//! implementation; tests substitute in-memory mocks.
//!
//! Report-oriented endpoints follow the submit/poll/download contract: create
//! a report request, poll its processing status at a fixed interval with
//! bounded attempts, then fetch the finished document, gunzip it when the
//! document is flagged compressed, and parse the tab-delimited payload keyed
//! by its header row.

pub mod credentials;
pub mod errors;
pub mod marketplace;
pub mod models;
pub mod providers;
