//! FBA inbound shipment import.
//!
//! An inbound shipment is booked as up to two transfer legs keyed by the
//! remote shipment id:
//!
//! - `FBA/<id>`: origin location -> FBA transit, at the shipped quantity,
//!   once the goods leave the origin.
//! - `FBA/<id>/IN`: FBA transit -> FBA inbound, at the received quantity
//!   (falling back to shipped), once Amazon starts receiving.
//!
//! Cancelled shipments reverse whichever legs were already booked with
//! `<leg>/REV` transfers. All legs are idempotent: a leg reference that
//! already exists is never booked twice.
//!
//! A shipment whose origin address is unmapped, or that references a
//! product nobody created locally, blocks in its entirety rather than
//! importing half its lines.

use chrono::{Duration, Utc};
use diesel::SqliteConnection;
use spapi_ingestor::models::inbound::{InboundShipment, InboundShipmentItem, ShipFromAddress};
use spapi_ingestor::providers::SellerApi;
use tracing::{debug, warn};

use crate::accounts::Account;
use crate::addresses::{self, AddressTuple};
use crate::reconcile::QUANTITY_EPSILON;
use crate::registry::Registry;
use crate::stock::{MoveLine, StockMovementService, TransferState, execute_transfer};
use crate::sync::{ImportOutcome, ShipmentSyncStats, resolve};

/// How far back shipment sync looks for updates.
const SHIPMENT_LOOKBACK_DAYS: i64 = 30;

/// Statuses before goods leave the origin; nothing to book yet.
const PRE_TRANSIT: &[&str] = &["WORKING", "READY_TO_SHIP"];

/// Statuses with goods on the road; the first leg applies.
const IN_TRANSIT: &[&str] = &["SHIPPED", "IN_TRANSIT", "DELIVERED", "CHECKED_IN"];

/// Statuses with goods at the fulfillment center; both legs apply.
const ARRIVED: &[&str] = &["RECEIVING", "CLOSED"];

/// Imports one FBA inbound shipment from already-fetched data.
pub fn import_fba_shipment(
    conn: &mut SqliteConnection,
    service: &dyn StockMovementService,
    registry: &Registry,
    account: &str,
    shipment: &InboundShipment,
    items: &[InboundShipmentItem],
) -> anyhow::Result<ImportOutcome> {
    let leg1_ref = format!("FBA/{}", shipment.shipment_id);
    let leg2_ref = format!("{leg1_ref}/IN");

    if shipment.is_cancelled() {
        return reverse_booked_legs(conn, service, &[leg1_ref, leg2_ref]);
    }

    let status = shipment.shipment_status.as_str();
    if PRE_TRANSIT.contains(&status) {
        return Ok(ImportOutcome::Skipped);
    }
    let book_arrival = ARRIVED.contains(&status);
    if !book_arrival && !IN_TRANSIT.contains(&status) {
        warn!(shipment_id = %shipment.shipment_id, status, "unrecognized shipment status");
        return Ok(ImportOutcome::Skipped);
    }

    // Resolve the origin and every product before booking anything. The
    // address registration must survive a blocked import, so it happens
    // outside the booking transaction.
    let Some(address) = shipment.ship_from_address.as_ref() else {
        return Ok(ImportOutcome::Blocked(format!(
            "shipment {} has no ship-from address",
            shipment.shipment_id
        )));
    };
    let tuple = address_tuple(address);
    let Some(origin) = addresses::resolve_or_register(conn, &tuple)? else {
        return Ok(ImportOutcome::Blocked(format!(
            "origin address not mapped to a location: {}",
            tuple.summary()
        )));
    };

    let mut quantities: Vec<(i32, f64, f64)> = Vec::new();
    for item in items {
        let Some(product_id) = resolve_item_product(conn, account, item)? else {
            return Ok(ImportOutcome::Blocked(format!(
                "unknown product for SKU {}",
                item.seller_sku
            )));
        };
        quantities.push((
            product_id,
            item.quantity_shipped,
            item.quantity_received.unwrap_or(0.0),
        ));
    }

    let transit = registry.fba.transit;
    let inbound = registry.fba.inbound;
    let leg1_lines: Vec<MoveLine> = quantities
        .iter()
        .filter(|(_, shipped, _)| *shipped > QUANTITY_EPSILON)
        .map(|&(product_id, shipped, _)| MoveLine {
            product_id,
            source_location_id: origin,
            dest_location_id: transit,
            quantity: shipped,
        })
        .collect();
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
            let leg2_lines: Vec<MoveLine> = quantities
                .iter()
                .map(|&(product_id, shipped, received)| {
                    let quantity = if received > QUANTITY_EPSILON {
                        received
                    } else {
                        shipped
                    };
                    MoveLine {
                        product_id,
                        source_location_id: transit,
                        dest_location_id: inbound,
                        quantity,
                    }
                })
                .filter(|line| line.quantity > QUANTITY_EPSILON)
                .collect();
            if !leg2_lines.is_empty() {
                execute_transfer(service, conn, &leg2_ref, &leg2_lines)?;
                booked = true;
            }
        }
        Ok(())
    })?;

    Ok(if booked {
        ImportOutcome::Created
    } else {
        ImportOutcome::Skipped
    })
}

/// Reverses every validated leg that has no reversal yet.
pub(crate) fn reverse_booked_legs(
    conn: &mut SqliteConnection,
    service: &dyn StockMovementService,
    references: &[String],
) -> anyhow::Result<ImportOutcome> {
    let mut reversed_any = false;
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        for reference in references {
            let Some(original) = service.find_transfer(conn, reference)? else {
                continue;
            };
            if original.state != TransferState::Done {
                continue;
            }
            let reversal_ref = format!("{reference}/REV");
            if service.find_transfer(conn, &reversal_ref)?.is_some() {
                continue;
            }
            let lines: Vec<MoveLine> = service
                .transfer_lines(conn, original.id)?
                .iter()
                .map(MoveLine::reversed)
                .collect();
            if lines.is_empty() {
                continue;
            }
            execute_transfer(service, conn, &reversal_ref, &lines)?;
            reversed_any = true;
        }
        Ok(())
    })?;
    Ok(if reversed_any {
        ImportOutcome::Reversed
    } else {
        ImportOutcome::Skipped
    })
}

fn resolve_item_product(
    conn: &mut SqliteConnection,
    account: &str,
    item: &InboundShipmentItem,
) -> anyhow::Result<Option<i32>> {
    if let Some(id) = resolve::find_by_msku(conn, account, &item.seller_sku)? {
        return Ok(Some(id));
    }
    if let Some(fnsku) = item.fulfillment_network_sku.as_deref() {
        if let Some(id) = resolve::find_by_fnsku(conn, account, fnsku)? {
            resolve::ensure_msku(conn, id, account, &item.seller_sku)?;
            return Ok(Some(id));
        }
    }
    Ok(None)
}

fn address_tuple(address: &ShipFromAddress) -> AddressTuple {
    AddressTuple::from_parts(
        Some(&address.name),
        Some(&address.address_line1),
        address.address_line2.as_deref(),
        Some(&address.city),
        Some(&address.state_or_province_code),
        Some(&address.postal_code),
        Some(&address.country_code),
    )
}

fn needs_items(shipment: &InboundShipment) -> bool {
    !shipment.is_cancelled() && !PRE_TRANSIT.contains(&shipment.shipment_status.as_str())
}

/// Fetches recently updated FBA inbound shipments and imports each one.
pub async fn sync_fba_inbound(
    conn: &mut SqliteConnection,
    api: &dyn SellerApi,
    account: &Account,
    service: &dyn StockMovementService,
    registry: &Registry,
) -> anyhow::Result<ShipmentSyncStats> {
    let after = Utc::now() - Duration::days(SHIPMENT_LOOKBACK_DAYS);
    let shipments = api.fba_inbound_shipments(after).await?;
    let mut stats = ShipmentSyncStats::default();

    for shipment in &shipments {
        let items = if needs_items(shipment) {
            api.fba_inbound_shipment_items(&shipment.shipment_id).await?
        } else {
            Vec::new()
        };
        let outcome = import_fba_shipment(conn, service, registry, &account.code, shipment, &items)?;
        if let ImportOutcome::Blocked(reason) = &outcome {
            warn!(shipment_id = %shipment.shipment_id, %reason, "shipment import blocked");
        }
        stats.record(&outcome);
    }

    debug!(account = %account.code, %stats, "FBA inbound sync finished");
    Ok(stats)
}
