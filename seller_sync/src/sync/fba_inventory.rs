//! FBA inventory reconciliation.
//!
//! Amazon's inventory summaries report quantities per MSKU and bucket
//! (inbound, fulfillable, reserved, researching, unfulfillable). The
//! report is the source of truth: stored levels are driven to the
//! reported totals through the FBA adjustment location.
//!
//! Multiple MSKUs can map to one product; their quantities are summed
//! per (product, bucket) before reconciling so a product is adjusted
//! once, not once per listing.

use std::collections::BTreeMap;

use diesel::SqliteConnection;
use diesel::prelude::*;
use spapi_ingestor::models::inventory::InventorySummary;
use spapi_ingestor::providers::SellerApi;
use tracing::{debug, warn};

use crate::accounts::Account;
use crate::models::Product;
use crate::policy::{AccountPolicy, PolicyDecision, ValuationPolicy};
use crate::registry::{FbaWarehouse, Registry};
use crate::schema::products;
use crate::stock::StockMovementService;
use crate::sync::{InventorySyncStats, TargetMap, reconcile_targets, resolve};

/// Builds reconciliation targets from inventory summaries.
///
/// Rows for unknown products and policy-blocked products contribute no
/// targets; their counts land in the returned stats.
pub fn build_targets(
    conn: &mut SqliteConnection,
    account: &str,
    fba: &FbaWarehouse,
    policy: &dyn ValuationPolicy,
    summaries: &[InventorySummary],
) -> anyhow::Result<(TargetMap, InventorySyncStats)> {
    let mut stats = InventorySyncStats::default();
    let mut targets = TargetMap::new();
    let mut decisions: BTreeMap<i32, bool> = BTreeMap::new();

    for summary in summaries {
        let Some(product_id) = resolve_summary_product(conn, account, summary)? else {
            warn!(sku = %summary.seller_sku, "inventory row for unknown product");
            stats.skipped_unknown += 1;
            continue;
        };
        if !product_allowed(conn, policy, product_id, &mut decisions, &mut stats)? {
            continue;
        }
        if summary.inventory_details.is_none() {
            warn!(sku = %summary.seller_sku, "inventory summary lacks details");
            continue;
        }

        *targets.entry((product_id, fba.inbound)).or_default() += summary.inbound_total();
        *targets.entry((product_id, fba.stock)).or_default() += summary.fulfillable();
        *targets.entry((product_id, fba.reserved)).or_default() += summary.reserved_total();
        *targets.entry((product_id, fba.researching)).or_default() += summary.researching_total();
        *targets.entry((product_id, fba.unfulfillable)).or_default() +=
            summary.unfulfillable_total();
    }

    Ok((targets, stats))
}

/// One row can block a product for the whole run; evaluate the policy
/// once per product and remember the verdict.
pub(crate) fn product_allowed(
    conn: &mut SqliteConnection,
    policy: &dyn ValuationPolicy,
    product_id: i32,
    decisions: &mut BTreeMap<i32, bool>,
    stats: &mut InventorySyncStats,
) -> anyhow::Result<bool> {
    if let Some(&allowed) = decisions.get(&product_id) {
        return Ok(allowed);
    }
    let product = products::table
        .find(product_id)
        .select(Product::as_select())
        .first::<Product>(conn)?;
    let allowed = match policy.permits(&product) {
        PolicyDecision::Allow => true,
        PolicyDecision::Skip { reason } => {
            warn!(product_id, %reason, "inventory reconciliation skipped");
            stats.skipped_policy += 1;
            false
        }
    };
    decisions.insert(product_id, allowed);
    Ok(allowed)
}

fn resolve_summary_product(
    conn: &mut SqliteConnection,
    account: &str,
    summary: &InventorySummary,
) -> anyhow::Result<Option<i32>> {
    if let Some(id) = resolve::find_by_msku(conn, account, &summary.seller_sku)? {
        return Ok(Some(id));
    }
    if let Some(fnsku) = summary.fnsku.as_deref() {
        if let Some(id) = resolve::find_by_fnsku(conn, account, fnsku)? {
            resolve::ensure_msku(conn, id, account, &summary.seller_sku)?;
            return Ok(Some(id));
        }
    }
    if let Some(asin) = summary.asin.as_deref() {
        if let Some(id) = resolve::find_by_asin(conn, asin)? {
            resolve::ensure_msku(conn, id, account, &summary.seller_sku)?;
            if let Some(fnsku) = summary.fnsku.as_deref() {
                resolve::ensure_fnsku(conn, id, account, fnsku)?;
            }
            return Ok(Some(id));
        }
    }
    Ok(None)
}

/// Fetches inventory summaries and reconciles stored FBA levels.
pub async fn sync_fba_inventory(
    conn: &mut SqliteConnection,
    api: &dyn SellerApi,
    account: &Account,
    service: &dyn StockMovementService,
    registry: &Registry,
) -> anyhow::Result<InventorySyncStats> {
    let summaries = api.fba_inventory_summaries().await?;
    let policy = AccountPolicy::for_account(account);
    let (targets, mut stats) =
        build_targets(conn, &account.code, &registry.fba, &policy, &summaries)?;
    let (reconciled, unchanged) =
        reconcile_targets(conn, service, registry.fba.adjustment, &targets)?;
    stats.reconciled = reconciled;
    stats.unchanged = unchanged;
    debug!(account = %account.code, %stats, "FBA inventory sync finished");
    Ok(stats)
}
