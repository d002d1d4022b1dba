//! Rows of the inventory ledger detail report.

use indexmap::IndexMap;

/// One parsed row of the `GET_LEDGER_DETAIL_VIEW_DATA` report.
///
/// Column names vary between report generations: some documents emit spaced
/// headers (`Event Type`), others compact ones (`EventType`). Both spellings
/// are accepted. The date is kept as the raw report string; the ingest layer
/// owns parsing and the decision to drop unparsable rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LedgerRecord {
    /// Event date as reported (`MM/DD/YYYY`).
    pub date: Option<String>,
    /// Fulfillment network SKU.
    pub fnsku: Option<String>,
    /// Catalog identifier.
    pub asin: Option<String>,
    /// Merchant SKU.
    pub msku: Option<String>,
    /// Listing title.
    pub title: Option<String>,
    /// Ledger event type (`Receipts`, `WhseTransfer`, `Shipments`, ...).
    pub event_type: Option<String>,
    /// Remote reference id of the event.
    pub reference_id: Option<String>,
    /// Signed unit quantity.
    pub quantity: f64,
    /// Fulfillment center code.
    pub fulfillment_center: Option<String>,
    /// Inventory disposition (`SELLABLE`, `UNSELLABLE`, ...).
    pub disposition: Option<String>,
    /// Event reason code.
    pub reason: Option<String>,
    /// Country code of the fulfillment center.
    pub country: Option<String>,
    /// Quantity already reconciled remotely.
    pub reconciled_quantity: f64,
    /// Quantity not yet reconciled remotely.
    pub unreconciled_quantity: f64,
}

impl LedgerRecord {
    /// Builds a record from one parsed report row.
    pub fn from_record(record: &IndexMap<String, String>) -> Self {
        Self {
            date: field(record, &["Date"]),
            fnsku: field(record, &["FNSKU"]),
            asin: field(record, &["ASIN"]),
            msku: field(record, &["MSKU"]),
            title: field(record, &["Title"]),
            event_type: field(record, &["EventType", "Event Type"]),
            reference_id: field(record, &["ReferenceID", "Reference ID"]),
            quantity: to_float(field(record, &["Quantity"])),
            fulfillment_center: field(record, &["FulfillmentCenter", "Fulfillment Center"]),
            disposition: field(record, &["Disposition"]),
            reason: field(record, &["Reason"]),
            country: field(record, &["Country"]),
            reconciled_quantity: to_float(field(
                record,
                &["ReconciledQuantity", "Reconciled Quantity"],
            )),
            unreconciled_quantity: to_float(field(
                record,
                &["UnreconciledQuantity", "Unreconciled Quantity"],
            )),
        }
    }
}

fn field(record: &IndexMap<String, String>, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|n| record.get(*n))
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn to_float(value: Option<String>) -> f64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0.0)
}
