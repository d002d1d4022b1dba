//! Fee estimate payloads from the product fees API.
//!
//! Unlike the orders API, this family reports money amounts as numbers.

use serde::Deserialize;

/// Result wrapper around a single fee estimate.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeesEstimateResult {
    /// Estimate status (`Success`, `ClientError`, ...).
    pub status: Option<String>,
    /// The estimate itself, absent on failures.
    pub fees_estimate: Option<FeesEstimate>,
}

/// A fee estimate with its total.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeesEstimate {
    /// Total of all estimated fees.
    pub total_fees_estimate: Option<MoneyType>,
}

/// A currency amount as the fees API reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MoneyType {
    /// ISO currency code.
    pub currency_code: Option<String>,
    /// Numeric amount.
    #[serde(default)]
    pub amount: f64,
}

impl FeesEstimateResult {
    /// Total estimated fee amount, when the estimate succeeded and is
    /// non-zero.
    pub fn total_amount(&self) -> Option<f64> {
        self.fees_estimate
            .as_ref()
            .and_then(|e| e.total_fees_estimate.as_ref())
            .map(|t| t.amount)
            .filter(|a| *a != 0.0)
    }
}
