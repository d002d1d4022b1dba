//! FBA and AWD inventory summary payloads.

use serde::Deserialize;

/// One FBA inventory summary for a seller SKU.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    /// Catalog identifier.
    pub asin: Option<String>,
    /// Fulfillment network SKU.
    #[serde(rename = "fnSku")]
    pub fnsku: Option<String>,
    /// Merchant SKU the summary is keyed by.
    pub seller_sku: String,
    /// Quantity breakdown; present when `details=true` was requested.
    pub inventory_details: Option<InventoryDetails>,
}

/// Quantity breakdown of an FBA inventory summary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryDetails {
    /// Units in fulfillment centers ready to ship.
    #[serde(default)]
    pub fulfillable_quantity: f64,
    /// Inbound units not yet shipped by the seller.
    #[serde(default)]
    pub inbound_working_quantity: f64,
    /// Inbound units in transit to fulfillment centers.
    #[serde(default)]
    pub inbound_shipped_quantity: f64,
    /// Inbound units at a fulfillment center dock.
    #[serde(default)]
    pub inbound_receiving_quantity: f64,
    /// Reserved unit counters.
    pub reserved_quantity: Option<ReservedQuantity>,
    /// Units under investigation.
    pub researching_quantity: Option<ResearchingQuantity>,
    /// Units that cannot be sold.
    pub unfulfillable_quantity: Option<UnfulfillableQuantity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservedQuantity {
    /// Total units reserved for orders or transfers.
    #[serde(default)]
    pub total_reserved_quantity: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchingQuantity {
    /// Total units being researched.
    #[serde(default)]
    pub total_researching_quantity: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnfulfillableQuantity {
    /// Total unsellable units.
    #[serde(default)]
    pub total_unfulfillable_quantity: f64,
}

impl InventorySummary {
    /// Sum of the three inbound pipeline quantities.
    pub fn inbound_total(&self) -> f64 {
        self.inventory_details
            .as_ref()
            .map(|d| {
                d.inbound_working_quantity + d.inbound_shipped_quantity + d.inbound_receiving_quantity
            })
            .unwrap_or(0.0)
    }

    /// Fulfillable units on hand.
    pub fn fulfillable(&self) -> f64 {
        self.inventory_details
            .as_ref()
            .map(|d| d.fulfillable_quantity)
            .unwrap_or(0.0)
    }

    /// Total reserved units.
    pub fn reserved_total(&self) -> f64 {
        self.inventory_details
            .as_ref()
            .and_then(|d| d.reserved_quantity.as_ref())
            .map(|r| r.total_reserved_quantity)
            .unwrap_or(0.0)
    }

    /// Total units under research.
    pub fn researching_total(&self) -> f64 {
        self.inventory_details
            .as_ref()
            .and_then(|d| d.researching_quantity.as_ref())
            .map(|r| r.total_researching_quantity)
            .unwrap_or(0.0)
    }

    /// Total unfulfillable units.
    pub fn unfulfillable_total(&self) -> f64 {
        self.inventory_details
            .as_ref()
            .and_then(|d| d.unfulfillable_quantity.as_ref())
            .map(|u| u.total_unfulfillable_quantity)
            .unwrap_or(0.0)
    }
}

/// One AWD inventory listing entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwdInventoryItem {
    /// Merchant SKU.
    pub sku: String,
    /// Units inbound to the AWD network.
    #[serde(default)]
    pub total_inbound_quantity: f64,
    /// Units on hand in the AWD network.
    #[serde(default)]
    pub total_onhand_quantity: f64,
}
