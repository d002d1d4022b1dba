//! AWD inventory reconciliation.
//!
//! AWD reports two quantities per SKU: inbound and on-hand. Stored levels
//! for the AWD warehouse are driven to those totals through the AWD
//! adjustment location, mirroring the FBA flow with a smaller bucket set.

use std::collections::BTreeMap;

use diesel::SqliteConnection;
use spapi_ingestor::models::inventory::AwdInventoryItem;
use spapi_ingestor::providers::SellerApi;
use tracing::{debug, warn};

use crate::accounts::Account;
use crate::policy::{AccountPolicy, ValuationPolicy};
use crate::registry::{AwdWarehouse, Registry};
use crate::stock::StockMovementService;
use crate::sync::fba_inventory::product_allowed;
use crate::sync::{InventorySyncStats, TargetMap, reconcile_targets, resolve};

/// Builds reconciliation targets from AWD inventory rows.
///
/// AWD identifies goods by merchant SKU only; rows whose SKU has no
/// product mapping are counted and skipped.
pub fn build_targets(
    conn: &mut SqliteConnection,
    account: &str,
    awd: &AwdWarehouse,
    policy: &dyn ValuationPolicy,
    items: &[AwdInventoryItem],
) -> anyhow::Result<(TargetMap, InventorySyncStats)> {
    let mut stats = InventorySyncStats::default();
    let mut targets = TargetMap::new();
    let mut decisions: BTreeMap<i32, bool> = BTreeMap::new();

    for item in items {
        let Some(product_id) = resolve::find_by_msku(conn, account, &item.sku)? else {
            warn!(sku = %item.sku, "AWD inventory row for unknown product");
            stats.skipped_unknown += 1;
            continue;
        };
        if !product_allowed(conn, policy, product_id, &mut decisions, &mut stats)? {
            continue;
        }
        *targets.entry((product_id, awd.inbound)).or_default() += item.total_inbound_quantity;
        *targets.entry((product_id, awd.stock)).or_default() += item.total_onhand_quantity;
    }

    Ok((targets, stats))
}

/// Fetches AWD inventory and reconciles stored AWD levels.
pub async fn sync_awd_inventory(
    conn: &mut SqliteConnection,
    api: &dyn SellerApi,
    account: &Account,
    service: &dyn StockMovementService,
    registry: &Registry,
) -> anyhow::Result<InventorySyncStats> {
    let items = api.awd_inventory().await?;
    let policy = AccountPolicy::for_account(account);
    let (targets, mut stats) = build_targets(conn, &account.code, &registry.awd, &policy, &items)?;
    let (reconciled, unchanged) =
        reconcile_targets(conn, service, registry.awd.adjustment, &targets)?;
    stats.reconciled = reconciled;
    stats.unchanged = unchanged;
    debug!(account = %account.code, %stats, "AWD inventory sync finished");
    Ok(stats)
}
