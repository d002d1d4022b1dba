//! Warehouse and location registry.
//!
//! Every sync flow books quantity against a fixed set of warehouses and
//! locations. [`Registry::init`] gets-or-creates that set and hands back
//! the row ids, so callers never chase codes through the database again.
//!
//! Fixed layout:
//! - `FBA` warehouse with one internal location per inventory bucket
//! - `AWD` warehouse with inbound and stock locations
//! - Warehouse-less transit locations (`TRANSIT/FBA`, `TRANSIT/AWD`)
//! - Warehouse-less adjustment locations (`ADJ/FBA`, `ADJ/AWD`)
//! - A single `CUSTOMERS` destination for sold goods

use diesel::prelude::*;
use diesel::{SqliteConnection, insert_into};
use tracing::debug;

use crate::models::{NewStockLocation, NewWarehouse};
use crate::schema::{stock_locations, warehouses};

/// Classification of a stock location.
///
/// Stored as text; matches the CHECK constraint on `stock_locations.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    /// Counts toward on-hand inventory inside a warehouse.
    Internal,
    /// Goods in motion between warehouses.
    Transit,
    /// Suspense counterparty for reconciliation writes.
    Adjustment,
    /// Terminal destination for fulfilled orders.
    Customer,
}

impl LocationKind {
    /// Database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationKind::Internal => "internal",
            LocationKind::Transit => "transit",
            LocationKind::Adjustment => "adjustment",
            LocationKind::Customer => "customer",
        }
    }
}

/// Location ids for the FBA warehouse and its satellite locations.
#[derive(Debug, Clone, Copy)]
pub struct FbaWarehouse {
    /// Row id of the `FBA` warehouse.
    pub warehouse_id: i32,
    /// Goods Amazon has received but not yet shelved.
    pub inbound: i32,
    /// Sellable on-hand quantity.
    pub stock: i32,
    /// Quantity reserved for customer orders or transfers.
    pub reserved: i32,
    /// Quantity under investigation at the fulfillment center.
    pub researching: i32,
    /// Damaged or otherwise unsellable quantity.
    pub unfulfillable: i32,
    /// Transit location for shipments headed to FBA.
    pub transit: i32,
    /// Adjustment counterparty for FBA reconciliation.
    pub adjustment: i32,
}

impl FbaWarehouse {
    /// Bucket locations in a stable order, paired with their report keys.
    pub fn buckets(&self) -> [(&'static str, i32); 5] {
        [
            ("inbound", self.inbound),
            ("stock", self.stock),
            ("reserved", self.reserved),
            ("researching", self.researching),
            ("unfulfillable", self.unfulfillable),
        ]
    }
}

/// Location ids for the AWD warehouse and its satellite locations.
#[derive(Debug, Clone, Copy)]
pub struct AwdWarehouse {
    /// Row id of the `AWD` warehouse.
    pub warehouse_id: i32,
    /// Goods in receiving at an AWD distribution center.
    pub inbound: i32,
    /// Stored on-hand quantity.
    pub stock: i32,
    /// Transit location for shipments headed to AWD.
    pub transit: i32,
    /// Adjustment counterparty for AWD reconciliation.
    pub adjustment: i32,
}

/// Resolved ids for the whole fixed warehouse layout.
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    /// FBA warehouse and locations.
    pub fba: FbaWarehouse,
    /// AWD warehouse and locations.
    pub awd: AwdWarehouse,
    /// The shared customers location.
    pub customers: i32,
}

impl Registry {
    /// Gets-or-creates the fixed warehouse layout and returns its ids.
    ///
    /// Safe to call on every run; existing rows are reused by code.
    pub fn init(conn: &mut SqliteConnection) -> anyhow::Result<Registry> {
        let fba_wh = get_or_create_warehouse(conn, "FBA", "FBA Inventory")?;
        let awd_wh = get_or_create_warehouse(conn, "AWD", "Amazon Warehousing and Distribution")?;

        let internal = |conn: &mut SqliteConnection, wh, code, name| {
            get_or_create_location(conn, Some(wh), code, name, LocationKind::Internal)
        };

        let fba = FbaWarehouse {
            warehouse_id: fba_wh,
            inbound: internal(conn, fba_wh, "FBA/INBOUND", "FBA Inbound")?,
            stock: internal(conn, fba_wh, "FBA/STOCK", "FBA Stock")?,
            reserved: internal(conn, fba_wh, "FBA/RESERVED", "FBA Reserved")?,
            researching: internal(conn, fba_wh, "FBA/RESEARCHING", "FBA Researching")?,
            unfulfillable: internal(conn, fba_wh, "FBA/UNFULFILLABLE", "FBA Unfulfillable")?,
            transit: get_or_create_location(
                conn,
                None,
                "TRANSIT/FBA",
                "In transit to FBA",
                LocationKind::Transit,
            )?,
            adjustment: get_or_create_location(
                conn,
                None,
                "ADJ/FBA",
                "FBA Adjustments",
                LocationKind::Adjustment,
            )?,
        };

        let awd = AwdWarehouse {
            warehouse_id: awd_wh,
            inbound: internal(conn, awd_wh, "AWD/INBOUND", "AWD Inbound")?,
            stock: internal(conn, awd_wh, "AWD/STOCK", "AWD Stock")?,
            transit: get_or_create_location(
                conn,
                None,
                "TRANSIT/AWD",
                "In transit to AWD",
                LocationKind::Transit,
            )?,
            adjustment: get_or_create_location(
                conn,
                None,
                "ADJ/AWD",
                "AWD Adjustments",
                LocationKind::Adjustment,
            )?,
        };

        let customers =
            get_or_create_location(conn, None, "CUSTOMERS", "Customers", LocationKind::Customer)?;

        debug!(
            fba_warehouse = fba.warehouse_id,
            awd_warehouse = awd.warehouse_id,
            "warehouse registry ready"
        );
        Ok(Registry {
            fba,
            awd,
            customers,
        })
    }
}

/// Insert-if-missing by code, then return the row id.
fn get_or_create_warehouse(
    conn: &mut SqliteConnection,
    code: &str,
    name: &str,
) -> anyhow::Result<i32> {
    let row = NewWarehouse { code, name };
    insert_into(warehouses::table)
        .values(&row)
        .on_conflict(warehouses::code)
        .do_nothing()
        .execute(conn)?;

    let id = warehouses::table
        .filter(warehouses::code.eq(code))
        .select(warehouses::id)
        .first::<i32>(conn)?;
    Ok(id)
}

fn get_or_create_location(
    conn: &mut SqliteConnection,
    warehouse_id: Option<i32>,
    code: &str,
    name: &str,
    kind: LocationKind,
) -> anyhow::Result<i32> {
    let row = NewStockLocation {
        warehouse_id,
        code,
        name,
        kind: kind.as_str(),
    };
    insert_into(stock_locations::table)
        .values(&row)
        .on_conflict(stock_locations::code)
        .do_nothing()
        .execute(conn)?;

    let id = stock_locations::table
        .filter(stock_locations::code.eq(code))
        .select(stock_locations::id)
        .first::<i32>(conn)?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_kind_strings_match_schema_check() {
        assert_eq!(LocationKind::Internal.as_str(), "internal");
        assert_eq!(LocationKind::Transit.as_str(), "transit");
        assert_eq!(LocationKind::Adjustment.as_str(), "adjustment");
        assert_eq!(LocationKind::Customer.as_str(), "customer");
    }

    #[test]
    fn fba_bucket_listing_is_stable() {
        let fba = FbaWarehouse {
            warehouse_id: 1,
            inbound: 10,
            stock: 11,
            reserved: 12,
            researching: 13,
            unfulfillable: 14,
            transit: 15,
            adjustment: 16,
        };
        let keys: Vec<&str> = fba.buckets().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec!["inbound", "stock", "reserved", "researching", "unfulfillable"]
        );
    }
}
