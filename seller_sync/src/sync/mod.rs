//! Per-concern sync flows.
//!
//! Each submodule owns one remote feed and knows how to land it in the
//! warehouse: listings become products, inventory summaries become
//! reconciliation targets, inbound shipments and orders become stock
//! transfers, fee estimates become listing fee rows.
//!
//! Flows share two conventions:
//! - Import functions are synchronous and take already-fetched payloads,
//!   so behavior is testable without a remote.
//! - `sync_*` orchestrators fetch via [`SellerApi`](spapi_ingestor::providers::SellerApi)
//!   and drive the import functions.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Utc;
use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use crate::reconcile::Reconciler;
use crate::schema::stock_locations;
use crate::stock::StockMovementService;

pub mod awd_inbound;
pub mod awd_inventory;
pub mod fba_inbound;
pub mod fba_inventory;
pub mod fees;
pub mod orders;
pub mod products;
pub mod resolve;

/// What happened to one inbound shipment during import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// At least one transfer leg was booked.
    Created,
    /// Nothing to do: not yet shipped, or already booked.
    Skipped,
    /// The shipment was cancelled and its booked legs were reversed.
    Reversed,
    /// Import was blocked; the reason says what an operator must fix.
    Blocked(String),
}

/// Counters produced by one shipment sync run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ShipmentSyncStats {
    /// Shipments that booked at least one new leg.
    pub created: usize,
    /// Shipments with nothing to do.
    pub skipped: usize,
    /// Cancelled shipments whose legs were reversed.
    pub reversed: usize,
    /// Shipments blocked on operator action.
    pub blocked: usize,
}

impl ShipmentSyncStats {
    /// Folds one import outcome into the counters.
    pub fn record(&mut self, outcome: &ImportOutcome) {
        match outcome {
            ImportOutcome::Created => self.created += 1,
            ImportOutcome::Skipped => self.skipped += 1,
            ImportOutcome::Reversed => self.reversed += 1,
            ImportOutcome::Blocked(_) => self.blocked += 1,
        }
    }
}

impl fmt::Display for ShipmentSyncStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} skipped, {} reversed, {} blocked",
            self.created, self.skipped, self.reversed, self.blocked
        )
    }
}

/// Counters produced by one inventory reconciliation run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InventorySyncStats {
    /// (product, location) pairs that needed an adjustment.
    pub reconciled: usize,
    /// Pairs already at their reported level.
    pub unchanged: usize,
    /// Products skipped by the account's valuation policy.
    pub skipped_policy: usize,
    /// Report rows whose product is not known locally.
    pub skipped_unknown: usize,
}

impl fmt::Display for InventorySyncStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} reconciled, {} unchanged, {} policy-skipped, {} unknown",
            self.reconciled, self.unchanged, self.skipped_policy, self.skipped_unknown
        )
    }
}

/// Reconciliation targets keyed by (product id, location id).
pub type TargetMap = BTreeMap<(i32, i32), f64>;

/// Reconciles a target map against stored levels through one adjustment
/// location. Returns (reconciled, unchanged) counts.
pub(crate) fn reconcile_targets(
    conn: &mut SqliteConnection,
    service: &dyn StockMovementService,
    adjustment_location_id: i32,
    targets: &TargetMap,
) -> anyhow::Result<(usize, usize)> {
    let reconciler = Reconciler::new(service, adjustment_location_id);
    let mut reconciled = 0;
    let mut unchanged = 0;

    for (&(product_id, location_id), &target) in targets {
        let reference = adjustment_reference(conn, location_id, product_id)?;
        if reconciler.reconcile_and_apply(conn, product_id, location_id, target, &reference)? {
            reconciled += 1;
        } else {
            unchanged += 1;
        }
    }

    debug!(reconciled, unchanged, "reconciliation pass finished");
    Ok((reconciled, unchanged))
}

/// Unique reference for one adjustment transfer.
///
/// The timestamp suffix keeps repeated adjustments of the same pair
/// distinct; references are unique in the transfers table.
fn adjustment_reference(
    conn: &mut SqliteConnection,
    location_id: i32,
    product_id: i32,
) -> anyhow::Result<String> {
    let code = location_code(conn, location_id)?;
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    Ok(format!("ADJ/{code}/{product_id}/{nanos}"))
}

/// Code of a stock location by id.
pub(crate) fn location_code(conn: &mut SqliteConnection, id: i32) -> anyhow::Result<String> {
    let code = stock_locations::table
        .find(id)
        .select(stock_locations::code)
        .first::<String>(conn)?;
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_fold_outcomes() {
        let mut stats = ShipmentSyncStats::default();
        stats.record(&ImportOutcome::Created);
        stats.record(&ImportOutcome::Skipped);
        stats.record(&ImportOutcome::Skipped);
        stats.record(&ImportOutcome::Reversed);
        stats.record(&ImportOutcome::Blocked("origin address unmapped".into()));
        assert_eq!(stats.created, 1);
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.reversed, 1);
        assert_eq!(stats.blocked, 1);
        assert_eq!(stats.to_string(), "1 created, 2 skipped, 1 reversed, 1 blocked");
    }
}
