//! Sales order, invoicing and fee models.

use diesel::prelude::*;

use crate::models::inventory::Product;
use crate::schema::*;

/// A row in [`crate::schema::partners`].
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = partners, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Partner {
    /// Database primary key.
    pub id: i32,
    /// Unique partner name.
    pub name: String,
    /// City, when known.
    pub city: Option<String>,
    /// Two-letter country code, when known.
    pub country_code: Option<String>,
}

/// Insertable form of [`Partner`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = partners)]
pub struct NewPartner<'a> {
    /// Unique partner name.
    pub name: &'a str,
    /// City.
    pub city: Option<&'a str>,
    /// Country code.
    pub country_code: Option<&'a str>,
}

/// A row in [`crate::schema::taxes`]: one percentage tax profile, named by
/// its percentage ("8.25%").
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = taxes, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Tax {
    /// Database primary key.
    pub id: i32,
    /// Unique name, derived from the percentage.
    pub name: String,
    /// Tax percentage.
    pub percent: f64,
}

/// Insertable form of [`Tax`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = taxes)]
pub struct NewTax<'a> {
    /// Unique name.
    pub name: &'a str,
    /// Tax percentage.
    pub percent: f64,
}

/// A row in [`crate::schema::sale_orders`]: one imported marketplace order.
///
/// `reference` holds the marketplace order id and is the idempotence key.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = sale_orders, check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(belongs_to(Partner, foreign_key = partner_id))]
pub struct SaleOrder {
    /// Database primary key.
    pub id: i32,
    /// Marketplace order id.
    pub reference: String,
    /// Account code the order was imported for.
    pub account: String,
    /// FK to [`Partner::id`].
    pub partner_id: i32,
    /// Lifecycle state: draft | confirmed | done | cancelled.
    pub state: String,
    /// Purchase date (RFC3339 UTC).
    pub order_date: String,
    /// Expected handover date.
    pub commitment_date: Option<String>,
    /// Latest ship date promised to the buyer.
    pub deadline_date: Option<String>,
    /// Row creation timestamp (RFC3339 UTC).
    pub created_at: String,
}

/// Insertable form of [`SaleOrder`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sale_orders)]
pub struct NewSaleOrder<'a> {
    /// Marketplace order id.
    pub reference: &'a str,
    /// Account code.
    pub account: &'a str,
    /// FK to [`Partner::id`].
    pub partner_id: i32,
    /// Initial state.
    pub state: &'a str,
    /// Purchase date.
    pub order_date: &'a str,
    /// Expected handover date.
    pub commitment_date: Option<&'a str>,
    /// Latest ship date.
    pub deadline_date: Option<&'a str>,
}

/// A row in [`crate::schema::sale_order_lines`].
///
/// Shipping lines carry no product (`product_id` NULL, `is_shipping` true).
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = sale_order_lines, check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(belongs_to(SaleOrder, foreign_key = order_id))]
pub struct SaleOrderLine {
    /// Database primary key.
    pub id: i32,
    /// FK to [`SaleOrder::id`].
    pub order_id: i32,
    /// FK to [`Product::id`]; NULL for shipping lines.
    pub product_id: Option<i32>,
    /// Line description.
    pub description: String,
    /// Ordered quantity.
    pub quantity: f64,
    /// Unit price.
    pub unit_price: f64,
    /// FK to [`Tax::id`], when a tax applies.
    pub tax_id: Option<i32>,
    /// True for the synthetic shipping line.
    pub is_shipping: bool,
}

/// Insertable form of [`SaleOrderLine`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sale_order_lines)]
pub struct NewSaleOrderLine<'a> {
    /// FK to [`SaleOrder::id`].
    pub order_id: i32,
    /// FK to [`Product::id`]; None for shipping lines.
    pub product_id: Option<i32>,
    /// Line description.
    pub description: &'a str,
    /// Ordered quantity.
    pub quantity: f64,
    /// Unit price.
    pub unit_price: f64,
    /// FK to [`Tax::id`].
    pub tax_id: Option<i32>,
    /// True for the synthetic shipping line.
    pub is_shipping: bool,
}

/// A row in [`crate::schema::invoices`]: at most one per sale order.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = invoices, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Invoice {
    /// Database primary key.
    pub id: i32,
    /// FK to [`SaleOrder::id`], unique.
    pub order_id: i32,
    /// draft | posted.
    pub state: String,
    /// Invoice total, tax inclusive.
    pub total: f64,
    /// Row creation timestamp (RFC3339 UTC).
    pub created_at: String,
}

/// Insertable form of [`Invoice`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invoices)]
pub struct NewInvoice<'a> {
    /// FK to [`SaleOrder::id`].
    pub order_id: i32,
    /// Initial state.
    pub state: &'a str,
    /// Invoice total.
    pub total: f64,
}

/// A row in [`crate::schema::listing_fees`]: estimated fulfillment fees per
/// product and account.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = listing_fees, check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(belongs_to(Product, foreign_key = product_id))]
pub struct ListingFee {
    /// Database primary key.
    pub id: i32,
    /// FK to [`Product::id`].
    pub product_id: i32,
    /// Account code.
    pub account: String,
    /// Estimated FBA fulfillment fee total.
    pub est_fba_fee: Option<f64>,
    /// Estimated FBM fulfillment fee total.
    pub est_fbm_fee: Option<f64>,
    /// Last refresh timestamp (RFC3339 UTC).
    pub updated_at: String,
}

/// Insertable form of [`ListingFee`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = listing_fees)]
pub struct NewListingFee<'a> {
    /// FK to [`Product::id`].
    pub product_id: i32,
    /// Account code.
    pub account: &'a str,
    /// Estimated FBA fee.
    pub est_fba_fee: Option<f64>,
    /// Estimated FBM fee.
    pub est_fbm_fee: Option<f64>,
    /// Refresh timestamp.
    pub updated_at: &'a str,
}
