//! Stock movement, ledger and address mapping models.

use diesel::prelude::*;

use crate::models::inventory::Product;
use crate::schema::*;

/// A row in [`crate::schema::transfers`]: one stock transfer through the
/// lifecycle draft → confirmed → assigned → done (or cancelled).
///
/// `reference` is unique and is the idempotence key for imported shipments.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = transfers, check_for_backend(diesel::sqlite::Sqlite))]
pub struct Transfer {
    /// Database primary key.
    pub id: i32,
    /// Unique human-readable reference ("FBA/FBA15DJ8PLR", "LEDGER/42", ...).
    pub reference: String,
    /// Lifecycle state.
    pub state: String,
    /// Row creation timestamp (RFC3339 UTC).
    pub created_at: String,
    /// Row update timestamp (maintained by trigger on UPDATE).
    pub updated_at: String,
}

/// Insertable form of [`Transfer`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transfers)]
pub struct NewTransfer<'a> {
    /// Unique reference.
    pub reference: &'a str,
    /// Initial lifecycle state (typically "draft").
    pub state: &'a str,
}

/// A row in [`crate::schema::transfer_moves`]: one product line of a
/// transfer. Quantity is strictly positive; direction is carried by the
/// source/destination pair.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = transfer_moves, check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(belongs_to(Transfer, foreign_key = transfer_id))]
#[diesel(belongs_to(Product, foreign_key = product_id))]
pub struct TransferMove {
    /// Database primary key.
    pub id: i32,
    /// FK to [`Transfer::id`].
    pub transfer_id: i32,
    /// FK to [`Product::id`].
    pub product_id: i32,
    /// Source location id.
    pub source_location_id: i32,
    /// Destination location id.
    pub dest_location_id: i32,
    /// Moved quantity (> 0).
    pub quantity: f64,
}

/// Insertable form of [`TransferMove`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transfer_moves)]
pub struct NewTransferMove {
    /// FK to [`Transfer::id`].
    pub transfer_id: i32,
    /// FK to [`Product::id`].
    pub product_id: i32,
    /// Source location id.
    pub source_location_id: i32,
    /// Destination location id.
    pub dest_location_id: i32,
    /// Moved quantity (> 0).
    pub quantity: f64,
}

/// A row in [`crate::schema::ledger_entries`]: one remote inventory ledger
/// event.
///
/// Natural key: (account, ledger_date, fnsku, event_type, reference_id,
/// fulfillment_center); the two nullable-on-the-wire key parts are stored as
/// empty strings so the UNIQUE constraint holds. `transfer_id` is NULL until
/// the entry has been applied.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = ledger_entries, check_for_backend(diesel::sqlite::Sqlite))]
pub struct LedgerEntry {
    /// Database primary key.
    pub id: i32,
    /// Account code the entry was fetched for.
    pub account: String,
    /// Event date, ISO `YYYY-MM-DD`.
    pub ledger_date: String,
    /// Fulfillment-network SKU.
    pub fnsku: String,
    /// Catalog id, when present in the feed.
    pub asin: Option<String>,
    /// Merchant SKU, when present in the feed.
    pub msku: Option<String>,
    /// Listing title, when present in the feed.
    pub title: Option<String>,
    /// Remote event type ("Receipts", "WhseTransfer", ...).
    pub event_type: String,
    /// Remote reference id; empty string when the feed leaves it blank.
    pub reference_id: String,
    /// Signed event quantity.
    pub quantity: f64,
    /// Fulfillment center code; empty string when blank.
    pub fulfillment_center: String,
    /// Disposition (SELLABLE, DEFECTIVE, ...), stored for audit only.
    pub disposition: Option<String>,
    /// Event reason code.
    pub reason: Option<String>,
    /// Country code.
    pub country: Option<String>,
    /// FK to the transfer this entry produced; NULL while unprocessed.
    pub transfer_id: Option<i32>,
    /// Row creation timestamp (RFC3339 UTC).
    pub created_at: String,
}

/// Insertable form of [`LedgerEntry`] for ingestion.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ledger_entries)]
pub struct NewLedgerEntry<'a> {
    /// Account code.
    pub account: &'a str,
    /// Event date, ISO `YYYY-MM-DD`.
    pub ledger_date: &'a str,
    /// Fulfillment-network SKU.
    pub fnsku: &'a str,
    /// Catalog id.
    pub asin: Option<&'a str>,
    /// Merchant SKU.
    pub msku: Option<&'a str>,
    /// Listing title.
    pub title: Option<&'a str>,
    /// Remote event type.
    pub event_type: &'a str,
    /// Remote reference id ('' when blank).
    pub reference_id: &'a str,
    /// Signed event quantity.
    pub quantity: f64,
    /// Fulfillment center code ('' when blank).
    pub fulfillment_center: &'a str,
    /// Disposition.
    pub disposition: Option<&'a str>,
    /// Event reason code.
    pub reason: Option<&'a str>,
    /// Country code.
    pub country: Option<&'a str>,
}

/// A row in [`crate::schema::address_mappings`]: one remote ship-from
/// address and the location it maps to.
///
/// `location_id` NULL means the address is registered but not yet mapped by
/// a human; shipment import skips such shipments until it is.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = address_mappings, check_for_backend(diesel::sqlite::Sqlite))]
pub struct AddressMapping {
    /// Database primary key.
    pub id: i32,
    /// Contact or facility name.
    pub name: String,
    /// First address line.
    pub address_line1: String,
    /// Second address line ('' when absent).
    pub address_line2: String,
    /// City.
    pub city: String,
    /// State or region code.
    pub state_or_region: String,
    /// Postal code.
    pub postal_code: String,
    /// Two-letter country code.
    pub country_code: String,
    /// Mapped location; NULL while unmapped.
    pub location_id: Option<i32>,
    /// Row creation timestamp (RFC3339 UTC).
    pub created_at: String,
}

/// Insertable form of [`AddressMapping`]; always starts unmapped.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = address_mappings)]
pub struct NewAddressMapping<'a> {
    /// Contact or facility name.
    pub name: &'a str,
    /// First address line.
    pub address_line1: &'a str,
    /// Second address line.
    pub address_line2: &'a str,
    /// City.
    pub city: &'a str,
    /// State or region code.
    pub state_or_region: &'a str,
    /// Postal code.
    pub postal_code: &'a str,
    /// Two-letter country code.
    pub country_code: &'a str,
}
