//! Product catalog and stock layout models.

use diesel::prelude::*;

use crate::schema::*;

/// A row in [`crate::schema::products`]: one locally tracked catalog product.
///
/// Products created as placeholders from ledger or listing data carry
/// `needs_review = true` until someone fills in the real name and costing.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = products, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Product {
    /// Database primary key.
    pub id: i32,
    /// Catalog-wide product id; NULL for products created without one.
    pub asin: Option<String>,
    /// Display name.
    pub name: String,
    /// Internal reference, typically the merchant SKU it was first seen as.
    pub default_code: Option<String>,
    /// Base sales price.
    pub price: f64,
    /// Unit cost used by valuation checks.
    pub cost: f64,
    /// Valuation method: "avco" | "standard" | "fifo".
    pub valuation: String,
    /// Unit weight in kilograms, from catalog enrichment.
    pub weight_kg: Option<f64>,
    /// Package volume in cubic meters, from catalog enrichment.
    pub volume_m3: Option<f64>,
    /// Placeholder flag: true until manually reviewed.
    pub needs_review: bool,
    /// Row creation timestamp (RFC3339 UTC).
    pub created_at: String,
    /// Row update timestamp (maintained by trigger on UPDATE).
    pub updated_at: String,
}

/// Insertable form of [`Product`] for creating new rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = products)]
pub struct NewProduct<'a> {
    /// Catalog-wide product id, when known.
    pub asin: Option<&'a str>,
    /// Display name.
    pub name: &'a str,
    /// Internal reference.
    pub default_code: Option<&'a str>,
    /// Placeholder flag.
    pub needs_review: bool,
}

/// A row in [`crate::schema::product_asin_mskus`]: one merchant SKU attached
/// to a product for one account.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = product_asin_mskus, check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(belongs_to(Product, foreign_key = product_id))]
pub struct ProductMsku {
    /// Database primary key.
    pub id: i32,
    /// FK to [`Product::id`].
    pub product_id: i32,
    /// Account code the mapping belongs to.
    pub account: String,
    /// Merchant SKU.
    pub msku: String,
}

/// Insertable form of [`ProductMsku`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = product_asin_mskus)]
pub struct NewProductMsku<'a> {
    /// FK to [`Product::id`].
    pub product_id: i32,
    /// Account code.
    pub account: &'a str,
    /// Merchant SKU.
    pub msku: &'a str,
}

/// A row in [`crate::schema::product_asin_fnskus`]: one fulfillment-network
/// SKU attached to a product for one account.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = product_asin_fnskus, check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(belongs_to(Product, foreign_key = product_id))]
pub struct ProductFnsku {
    /// Database primary key.
    pub id: i32,
    /// FK to [`Product::id`].
    pub product_id: i32,
    /// Account code the mapping belongs to.
    pub account: String,
    /// Fulfillment-network SKU.
    pub fnsku: String,
}

/// Insertable form of [`ProductFnsku`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = product_asin_fnskus)]
pub struct NewProductFnsku<'a> {
    /// FK to [`Product::id`].
    pub product_id: i32,
    /// Account code.
    pub account: &'a str,
    /// Fulfillment-network SKU.
    pub fnsku: &'a str,
}

/// A row in [`crate::schema::warehouses`].
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = warehouses, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Warehouse {
    /// Database primary key.
    pub id: i32,
    /// Stable code ("FBA", "AWD").
    pub code: String,
    /// Display name.
    pub name: String,
}

/// Insertable form of [`Warehouse`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = warehouses)]
pub struct NewWarehouse<'a> {
    /// Stable code.
    pub code: &'a str,
    /// Display name.
    pub name: &'a str,
}

/// A row in [`crate::schema::stock_locations`].
///
/// `kind` is constrained to "internal" | "transit" | "adjustment" |
/// "customer". Virtual locations (transit, adjustment, customer) carry no
/// warehouse.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = stock_locations, check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(belongs_to(Warehouse, foreign_key = warehouse_id))]
pub struct StockLocation {
    /// Database primary key.
    pub id: i32,
    /// FK to [`Warehouse::id`]; NULL for virtual locations.
    pub warehouse_id: Option<i32>,
    /// Stable code ("FBA/STOCK", "ADJ/FBA", ...).
    pub code: String,
    /// Display name.
    pub name: String,
    /// Location kind.
    pub kind: String,
}

/// Insertable form of [`StockLocation`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = stock_locations)]
pub struct NewStockLocation<'a> {
    /// FK to [`Warehouse::id`]; None for virtual locations.
    pub warehouse_id: Option<i32>,
    /// Stable code.
    pub code: &'a str,
    /// Display name.
    pub name: &'a str,
    /// Location kind.
    pub kind: &'a str,
}

/// A row in [`crate::schema::stock_levels`]: on-hand quantity per
/// (product, location). Unique per pair.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = stock_levels, check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(belongs_to(Product, foreign_key = product_id))]
#[diesel(belongs_to(StockLocation, foreign_key = location_id))]
pub struct StockLevel {
    /// Database primary key.
    pub id: i32,
    /// FK to [`Product::id`].
    pub product_id: i32,
    /// FK to [`StockLocation::id`].
    pub location_id: i32,
    /// On-hand quantity.
    pub quantity: f64,
}

/// Insertable form of [`StockLevel`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = stock_levels)]
pub struct NewStockLevel {
    /// FK to [`Product::id`].
    pub product_id: i32,
    /// FK to [`StockLocation::id`].
    pub location_id: i32,
    /// Initial on-hand quantity.
    pub quantity: f64,
}
