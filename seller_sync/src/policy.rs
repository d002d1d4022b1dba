//! Valuation policy predicates.
//!
//! Accounts can restrict which products participate in inventory
//! reconciliation. The checks are a pluggable predicate so new rules can
//! be added without touching the reconciliation algorithm.

use crate::accounts::Account;
use crate::models::Product;

/// Outcome of a policy check for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Product participates in reconciliation.
    Allow,
    /// Product is skipped; the reason is logged at warn level.
    Skip {
        /// Human-readable reason for the skip.
        reason: String,
    },
}

/// Predicate deciding whether a product's inventory may be reconciled.
pub trait ValuationPolicy {
    /// Checks one product.
    fn permits(&self, product: &Product) -> PolicyDecision;
}

/// Policy that lets every product through. Used when an account has no
/// valuation toggles set.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl ValuationPolicy for AllowAll {
    fn permits(&self, _product: &Product) -> PolicyDecision {
        PolicyDecision::Allow
    }
}

/// Policy derived from an account's valuation toggles.
#[derive(Debug, Clone, Copy)]
pub struct AccountPolicy {
    skip_when_no_cost: bool,
    require_avco: bool,
}

impl AccountPolicy {
    /// Builds the policy from the account configuration.
    pub fn for_account(account: &Account) -> Self {
        Self {
            skip_when_no_cost: account.skip_inventory_when_no_product_cost,
            require_avco: account.skip_inventory_not_avco,
        }
    }
}

impl ValuationPolicy for AccountPolicy {
    fn permits(&self, product: &Product) -> PolicyDecision {
        if self.skip_when_no_cost && product.cost <= 0.0 {
            return PolicyDecision::Skip {
                reason: format!("product {} has no cost set", product.id),
            };
        }
        if self.require_avco && product.valuation != "avco" {
            return PolicyDecision::Skip {
                reason: format!(
                    "product {} uses {} valuation, not average cost",
                    product.id, product.valuation
                ),
            };
        }
        PolicyDecision::Allow
    }
}
