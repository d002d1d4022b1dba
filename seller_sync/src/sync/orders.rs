//! Shipped FBA order import.
//!
//! Amazon has already fulfilled these orders, so importing one means
//! recording the sale and moving the sold units out of FBA stock in the
//! same breath: create the sale order and its lines, book a transfer
//! from FBA stock to the customers location under `SO/<order id>`, then
//! mark the order done and optionally post an invoice.
//!
//! Each order commits atomically. A failure anywhere rolls the whole
//! order back, and the `SO/` reference makes re-imports no-ops.

use std::fmt;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use diesel::prelude::*;
use diesel::{SqliteConnection, insert_into};
use spapi_ingestor::models::orders::{Order, OrderItem};
use spapi_ingestor::providers::SellerApi;
use tracing::{debug, error, warn};

use crate::accounts::Account;
use crate::models::{NewInvoice, NewPartner, NewSaleOrder, NewSaleOrderLine, NewTax};
use crate::reconcile::QUANTITY_EPSILON;
use crate::registry::Registry;
use crate::schema::{invoices, partners, sale_order_lines, sale_orders, taxes};
use crate::stock::{MoveLine, StockMovementService, execute_transfer};
use crate::sync::resolve;

/// How far back order sync looks for updates.
const ORDER_LOOKBACK_DAYS: i64 = 5;

/// Partner every order books against when the account consolidates.
const CONSOLIDATED_PARTNER: &str = "Amazon_FBA";

/// What happened to one order during import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    /// The order, its lines, stock move, and invoice were recorded.
    Imported,
    /// An order with this reference already exists.
    AlreadyImported,
    /// The order does not qualify; the reason says why.
    Skipped(String),
}

/// Counters produced by one order sync run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct OrderSyncStats {
    /// Orders imported this run.
    pub imported: usize,
    /// Orders already present.
    pub already_imported: usize,
    /// Orders that do not qualify.
    pub skipped: usize,
    /// Orders that failed and were rolled back.
    pub failed: usize,
}

impl fmt::Display for OrderSyncStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} imported, {} already present, {} skipped, {} failed",
            self.imported, self.already_imported, self.skipped, self.failed
        )
    }
}

/// Imports one shipped FBA order from already-fetched data.
pub fn import_order(
    conn: &mut SqliteConnection,
    service: &dyn StockMovementService,
    registry: &Registry,
    account: &Account,
    order: &Order,
    items: &[OrderItem],
) -> anyhow::Result<OrderOutcome> {
    if !order.is_fba() {
        return Ok(OrderOutcome::Skipped("not fulfilled by Amazon".into()));
    }
    if order.order_status != "Shipped" {
        return Ok(OrderOutcome::Skipped(format!(
            "status is {}, not Shipped",
            order.order_status
        )));
    }

    let reference = format!("SO/{}", order.amazon_order_id);
    let existing = sale_orders::table
        .filter(sale_orders::reference.eq(&reference))
        .select(sale_orders::id)
        .first::<i32>(conn)
        .optional()?;
    if existing.is_some() {
        return Ok(OrderOutcome::AlreadyImported);
    }

    let any_units = items
        .iter()
        .any(|item| item.quantity_ordered as f64 > QUANTITY_EPSILON);
    if !any_units {
        return Ok(OrderOutcome::Skipped("no shippable lines".into()));
    }

    let purchase = parse_wire_datetime(order.purchase_date.as_deref()).unwrap_or_else(Utc::now);
    let order_date = wire_date_string(purchase);
    let commitment_date = wire_date_string(purchase + Duration::days(1));
    let deadline_date = parse_wire_datetime(order.latest_ship_date.as_deref())
        .map(wire_date_string);

    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let partner_id = order_partner(conn, account, order)?;
        let order_row = NewSaleOrder {
            reference: &reference,
            account: &account.code,
            partner_id,
            state: "confirmed",
            order_date: &order_date,
            commitment_date: Some(&commitment_date),
            deadline_date: deadline_date.as_deref(),
        };
        let order_id = insert_into(sale_orders::table)
            .values(&order_row)
            .returning(sale_orders::id)
            .get_result::<i32>(conn)?;

        let mut moves: Vec<MoveLine> = Vec::new();
        let mut total = 0.0;
        for item in items {
            let quantity = item.quantity_ordered as f64;
            if quantity <= QUANTITY_EPSILON {
                continue;
            }
            let product_id = resolve_order_product(conn, &account.code, item)?;
            let price = item.item_price.as_ref().map(|m| m.value()).unwrap_or(0.0);
            let unit_price = price / quantity;
            let tax_amount = item.item_tax.as_ref().map(|m| m.value()).unwrap_or(0.0);
            let tax_id = if account.import_fba_order_tax {
                derive_tax(conn, tax_amount, price)?
            } else {
                None
            };

            let description = item.seller_sku.as_deref().unwrap_or(&item.asin);
            let line = NewSaleOrderLine {
                order_id,
                product_id: Some(product_id),
                description,
                quantity,
                unit_price,
                tax_id,
                is_shipping: false,
            };
            insert_into(sale_order_lines::table).values(&line).execute(conn)?;

            total += price;
            if account.import_fba_order_tax {
                total += tax_amount;
            }
            moves.push(MoveLine {
                product_id,
                source_location_id: registry.fba.stock,
                dest_location_id: registry.customers,
                quantity,
            });
        }

        if moves.is_empty() {
            anyhow::bail!("order {} has no shippable lines", order.amazon_order_id);
        }

        if account.import_fba_order_shipping {
            let (net, tax_net) = shipping_totals(items);
            if net.abs() > QUANTITY_EPSILON {
                let tax_id = if account.import_fba_order_tax {
                    derive_tax(conn, tax_net, net)?
                } else {
                    None
                };
                let line = NewSaleOrderLine {
                    order_id,
                    product_id: None,
                    description: "Shipping",
                    quantity: 1.0,
                    unit_price: net,
                    tax_id,
                    is_shipping: true,
                };
                insert_into(sale_order_lines::table).values(&line).execute(conn)?;
                total += net;
                if account.import_fba_order_tax {
                    total += tax_net;
                }
            }
        }

        execute_transfer(service, conn, &reference, &moves)?;
        diesel::update(sale_orders::table.find(order_id))
            .set(sale_orders::state.eq("done"))
            .execute(conn)?;

        if account.invoice_fba_orders {
            let invoice = NewInvoice {
                order_id,
                state: "posted",
                total,
            };
            insert_into(invoices::table).values(&invoice).execute(conn)?;
        }
        Ok(())
    })?;

    Ok(OrderOutcome::Imported)
}

/// Resolves the partner an order books against.
///
/// Consolidating accounts use one shared partner; otherwise each order
/// gets a partner named after it, carrying the shipping city and country.
fn order_partner(
    conn: &mut SqliteConnection,
    account: &Account,
    order: &Order,
) -> anyhow::Result<i32> {
    if account.consolidated_fba_order_customer {
        return get_or_create_partner(conn, CONSOLIDATED_PARTNER, None, None);
    }
    let name = format!("Amazon customer {}", order.amazon_order_id);
    let (city, country) = match order.shipping_address.as_ref() {
        Some(addr) => (Some(addr.city.as_str()), Some(addr.country_code.as_str())),
        None => (None, None),
    };
    get_or_create_partner(conn, &name, city, country)
}

fn get_or_create_partner(
    conn: &mut SqliteConnection,
    name_: &str,
    city_: Option<&str>,
    country_code_: Option<&str>,
) -> anyhow::Result<i32> {
    let row = NewPartner {
        name: name_,
        city: city_,
        country_code: country_code_,
    };
    insert_into(partners::table)
        .values(&row)
        .on_conflict(partners::name)
        .do_nothing()
        .execute(conn)?;
    let id = partners::table
        .filter(partners::name.eq(name_))
        .select(partners::id)
        .first::<i32>(conn)?;
    Ok(id)
}

/// Derives a tax profile from charged amounts, creating the tax row on
/// first sight. Zero-priced lines carry no tax.
fn derive_tax(
    conn: &mut SqliteConnection,
    tax_amount: f64,
    price: f64,
) -> anyhow::Result<Option<i32>> {
    if price <= QUANTITY_EPSILON || tax_amount.abs() <= QUANTITY_EPSILON {
        return Ok(None);
    }
    let percent = ((tax_amount / price) * 100.0 * 100.0).round() / 100.0;
    let name = tax_label(percent);
    let row = NewTax {
        name: &name,
        percent,
    };
    insert_into(taxes::table)
        .values(&row)
        .on_conflict(taxes::name)
        .do_nothing()
        .execute(conn)?;
    let id = taxes::table
        .filter(taxes::name.eq(&name))
        .select(taxes::id)
        .first::<i32>(conn)?;
    Ok(Some(id))
}

fn tax_label(percent: f64) -> String {
    if (percent - percent.round()).abs() < 1e-9 {
        format!("{percent:.0}%")
    } else {
        format!("{percent:.2}%")
    }
}

/// Net shipping charge and its tax, summed across items.
///
/// Discounts reduce both the charge and the charged tax.
fn shipping_totals(items: &[OrderItem]) -> (f64, f64) {
    let mut net = 0.0;
    let mut tax_net = 0.0;
    for item in items {
        let money = |m: &Option<spapi_ingestor::models::orders::Money>| {
            m.as_ref().map(|m| m.value()).unwrap_or(0.0)
        };
        net += money(&item.shipping_price) - money(&item.shipping_discount);
        tax_net += money(&item.shipping_tax) - money(&item.shipping_discount_tax);
    }
    (net, tax_net)
}

/// Resolves an order item's product by ASIN, falling back to the
/// merchant SKU. An unknown product fails the order; the transaction
/// rolls it back and the batch moves on.
fn resolve_order_product(
    conn: &mut SqliteConnection,
    account: &str,
    item: &OrderItem,
) -> anyhow::Result<i32> {
    if let Some(id) = resolve::find_by_asin(conn, &item.asin)? {
        if let Some(sku) = item.seller_sku.as_deref() {
            resolve::ensure_msku(conn, id, account, sku)?;
        }
        return Ok(id);
    }
    if let Some(sku) = item.seller_sku.as_deref() {
        if let Some(id) = resolve::find_by_msku(conn, account, sku)? {
            return Ok(id);
        }
    }
    anyhow::bail!(
        "no product for ASIN {} (sku {})",
        item.asin,
        item.seller_sku.as_deref().unwrap_or("-")
    )
}

fn parse_wire_datetime(raw: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw?.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn wire_date_string(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Fetches recently updated orders and imports the shipped FBA ones.
///
/// Failures are per-order: a bad order is logged and rolled back while
/// the rest of the run continues.
pub async fn sync_orders(
    conn: &mut SqliteConnection,
    api: &dyn SellerApi,
    account: &Account,
    service: &dyn StockMovementService,
    registry: &Registry,
) -> anyhow::Result<OrderSyncStats> {
    let after = Utc::now() - Duration::days(ORDER_LOOKBACK_DAYS);
    let orders = api.orders_updated_after(after).await?;
    let mut stats = OrderSyncStats::default();

    for order in &orders {
        if !order.is_fba() || order.order_status != "Shipped" {
            stats.skipped += 1;
            continue;
        }
        let reference = format!("SO/{}", order.amazon_order_id);
        let exists = sale_orders::table
            .filter(sale_orders::reference.eq(&reference))
            .select(sale_orders::id)
            .first::<i32>(conn)
            .optional()?
            .is_some();
        if exists {
            stats.already_imported += 1;
            continue;
        }

        let items = api.order_items(&order.amazon_order_id).await?;
        match import_order(conn, service, registry, account, order, &items) {
            Ok(OrderOutcome::Imported) => stats.imported += 1,
            Ok(OrderOutcome::AlreadyImported) => stats.already_imported += 1,
            Ok(OrderOutcome::Skipped(reason)) => {
                warn!(order_id = %order.amazon_order_id, %reason, "order skipped");
                stats.skipped += 1;
            }
            Err(e) => {
                error!(order_id = %order.amazon_order_id, error = %e, "order import failed");
                stats.failed += 1;
            }
        }
    }

    debug!(account = %account.code, %stats, "order sync finished");
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tax_labels_trim_whole_percentages() {
        assert_eq!(tax_label(8.0), "8%");
        assert_eq!(tax_label(8.25), "8.25%");
        assert_eq!(tax_label(0.5), "0.50%");
    }

    #[test]
    fn wire_datetimes_round_trip_to_utc() {
        let parsed = parse_wire_datetime(Some("2025-03-04T10:30:00-05:00")).unwrap();
        assert_eq!(wire_date_string(parsed), "2025-03-04T15:30:00Z");
        assert_eq!(parse_wire_datetime(Some("yesterday")), None);
        assert_eq!(parse_wire_datetime(None), None);
    }
}
