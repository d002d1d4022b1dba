//! AWD inbound shipment import.
//!
//! Mirrors the FBA inbound flow with AWD's wire shapes: legs are keyed
//! `AWD/<id>` (origin -> AWD transit) and `AWD/<id>/IN` (transit -> AWD
//! inbound), and cancelled shipments reverse their booked legs.
//!
//! AWD reports contents as container counts: each container quantity
//! contributes `count x per-container quantity` units of its product.
//! Products are identified by their ASIN attribute, falling back to the
//! distribution SKU as a merchant SKU.

use std::collections::BTreeMap;

use diesel::SqliteConnection;
use spapi_ingestor::models::inbound::{AwdAddress, AwdShipmentDetail, AwdShipmentSummary};
use spapi_ingestor::providers::SellerApi;
use tracing::{debug, warn};

use crate::accounts::Account;
use crate::addresses::{self, AddressTuple};
use crate::reconcile::QUANTITY_EPSILON;
use crate::registry::Registry;
use crate::stock::{MoveLine, StockMovementService, execute_transfer};
use crate::sync::fba_inbound::reverse_booked_legs;
use crate::sync::{ImportOutcome, ShipmentSyncStats, resolve};

const PRE_TRANSIT: &[&str] = &["CREATED"];
const IN_TRANSIT: &[&str] = &["SHIPPED", "IN_TRANSIT", "DELIVERED"];
const ARRIVED: &[&str] = &["RECEIVING", "CLOSED"];

/// Imports one AWD inbound shipment from its fetched detail.
pub fn import_awd_shipment(
    conn: &mut SqliteConnection,
    service: &dyn StockMovementService,
    registry: &Registry,
    account: &str,
    detail: &AwdShipmentDetail,
) -> anyhow::Result<ImportOutcome> {
    let leg1_ref = format!("AWD/{}", detail.shipment_id);
    let leg2_ref = format!("{leg1_ref}/IN");

    if detail.is_cancelled() {
        return reverse_booked_legs(conn, service, &[leg1_ref, leg2_ref]);
    }

    let status = detail.shipment_status.as_str();
    if PRE_TRANSIT.contains(&status) {
        return Ok(ImportOutcome::Skipped);
    }
    let book_arrival = ARRIVED.contains(&status);
    if !book_arrival && !IN_TRANSIT.contains(&status) {
        warn!(shipment_id = %detail.shipment_id, status, "unrecognized AWD shipment status");
        return Ok(ImportOutcome::Skipped);
    }

    let Some(address) = detail.origin_address.as_ref() else {
        return Ok(ImportOutcome::Blocked(format!(
            "shipment {} has no origin address",
            detail.shipment_id
        )));
    };
    let tuple = address_tuple(address);
    let Some(origin) = addresses::resolve_or_register(conn, &tuple)? else {
        return Ok(ImportOutcome::Blocked(format!(
            "origin address not mapped to a location: {}",
            tuple.summary()
        )));
    };

    let quantities = match shipment_quantities(conn, account, detail)? {
        ContainerResolution::Resolved(q) => q,
        ContainerResolution::Blocked(reason) => return Ok(ImportOutcome::Blocked(reason)),
    };
    let lines = |source, dest| -> Vec<MoveLine> {
        quantities
            .iter()
            .filter(|&(_, &qty)| qty > QUANTITY_EPSILON)
            .map(|(&product_id, &quantity)| MoveLine {
                product_id,
                source_location_id: source,
                dest_location_id: dest,
                quantity,
            })
            .collect()
    };

    let leg1_lines = lines(origin, registry.awd.transit);
    if leg1_lines.is_empty() {
        return Ok(ImportOutcome::Skipped);
    }

    let mut booked = false;
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        if service.find_transfer(conn, &leg1_ref)?.is_none() {
            execute_transfer(service, conn, &leg1_ref, &leg1_lines)?;
            booked = true;
        }
        if book_arrival && service.find_transfer(conn, &leg2_ref)?.is_none() {
            let leg2_lines = lines(registry.awd.transit, registry.awd.inbound);
            execute_transfer(service, conn, &leg2_ref, &leg2_lines)?;
            booked = true;
        }
        Ok(())
    })?;

    Ok(if booked {
        ImportOutcome::Created
    } else {
        ImportOutcome::Skipped
    })
}

enum ContainerResolution {
    Resolved(BTreeMap<i32, f64>),
    Blocked(String),
}

/// Sums container contents into per-product unit quantities. AWD
/// shipments import all lines or none, so one unidentifiable product
/// blocks the whole shipment.
fn shipment_quantities(
    conn: &mut SqliteConnection,
    account: &str,
    detail: &AwdShipmentDetail,
) -> anyhow::Result<ContainerResolution> {
    let mut quantities: BTreeMap<i32, f64> = BTreeMap::new();

    for container in &detail.shipment_container_quantities {
        let products = container
            .distribution_package
            .as_ref()
            .and_then(|pkg| pkg.contents.as_ref())
            .map(|contents| contents.products.as_slice())
            .unwrap_or_default();

        for product in products {
            let resolved = resolve_distribution_product(
                conn,
                account,
                product.asin(),
                product.sku.as_deref(),
            )?;
            let Some(product_id) = resolved else {
                return Ok(ContainerResolution::Blocked(format!(
                    "unknown product in shipment {} (asin {:?}, sku {:?})",
                    detail.shipment_id,
                    product.asin(),
                    product.sku
                )));
            };
            *quantities.entry(product_id).or_default() +=
                f64::from(container.count) * product.quantity;
        }
    }

    Ok(ContainerResolution::Resolved(quantities))
}

fn resolve_distribution_product(
    conn: &mut SqliteConnection,
    account: &str,
    asin: Option<&str>,
    sku: Option<&str>,
) -> anyhow::Result<Option<i32>> {
    if let Some(asin) = asin {
        if let Some(id) = resolve::find_by_asin(conn, asin)? {
            if let Some(sku) = sku {
                resolve::ensure_msku(conn, id, account, sku)?;
            }
            return Ok(Some(id));
        }
    }
    if let Some(sku) = sku {
        if let Some(id) = resolve::find_by_msku(conn, account, sku)? {
            return Ok(Some(id));
        }
    }
    Ok(None)
}

fn address_tuple(address: &AwdAddress) -> AddressTuple {
    AddressTuple::from_parts(
        Some(&address.name),
        Some(&address.address_line1),
        address.address_line2.as_deref(),
        Some(&address.city),
        Some(&address.state_or_region),
        Some(&address.postal_code),
        Some(&address.country_code),
    )
}

fn needs_detail(summary: &AwdShipmentSummary) -> bool {
    summary.shipment_status != "CANCELLED"
        && !PRE_TRANSIT.contains(&summary.shipment_status.as_str())
}

/// Fetches AWD inbound shipments and imports each one.
pub async fn sync_awd_inbound(
    conn: &mut SqliteConnection,
    api: &dyn SellerApi,
    account: &Account,
    service: &dyn StockMovementService,
    registry: &Registry,
) -> anyhow::Result<ShipmentSyncStats> {
    let summaries = api.awd_inbound_shipments().await?;
    let mut stats = ShipmentSyncStats::default();

    for summary in &summaries {
        let outcome = if summary.shipment_status == "CANCELLED" {
            let leg1_ref = format!("AWD/{}", summary.shipment_id);
            let leg2_ref = format!("{leg1_ref}/IN");
            reverse_booked_legs(conn, service, &[leg1_ref, leg2_ref])?
        } else if !needs_detail(summary) {
            ImportOutcome::Skipped
        } else {
            let detail = api.awd_inbound_shipment(&summary.shipment_id).await?;
            import_awd_shipment(conn, service, registry, &account.code, &detail)?
        };
        if let ImportOutcome::Blocked(reason) = &outcome {
            warn!(shipment_id = %summary.shipment_id, %reason, "AWD shipment import blocked");
        }
        stats.record(&outcome);
    }

    debug!(account = %account.code, %stats, "AWD inbound sync finished");
    Ok(stats)
}
