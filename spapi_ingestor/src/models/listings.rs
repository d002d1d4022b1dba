//! Rows of the merchant open listings report.

use indexmap::IndexMap;

/// One listing row from the `GET_MERCHANT_LISTINGS_DATA` report.
///
/// The report is tab-delimited with hyphenated column names; only the
/// columns the sync engine consumes are extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRow {
    /// Catalog identifier (`asin1` column).
    pub asin: String,
    /// Merchant SKU (`seller-sku` column).
    pub seller_sku: String,
    /// Listing title (`item-name` column).
    pub item_name: Option<String>,
    /// Listed price, when the column parses as a number.
    pub price: Option<f64>,
    /// Fulfillment channel (`AMAZON_NA` for FBA, `DEFAULT` for FBM).
    pub fulfillment_channel: Option<String>,
}

impl ListingRow {
    /// Extracts a listing from one parsed report record.
    ///
    /// Returns `None` when the row lacks an ASIN or a seller SKU; such rows
    /// carry nothing the product importer can key on.
    pub fn from_record(record: &IndexMap<String, String>) -> Option<Self> {
        let asin = non_empty(record.get("asin1"))?;
        let seller_sku = non_empty(record.get("seller-sku"))?;
        Some(Self {
            asin,
            seller_sku,
            item_name: non_empty(record.get("item-name")),
            price: record.get("price").and_then(|p| p.trim().parse().ok()),
            fulfillment_channel: non_empty(record.get("fulfillment-channel")),
        })
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
