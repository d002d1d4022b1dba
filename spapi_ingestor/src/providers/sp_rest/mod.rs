//! REST implementation of the [`crate::providers::SellerApi`] trait.

pub mod auth;
pub mod provider;
pub mod reports;
pub mod response;

pub use provider::SpRestClient;
