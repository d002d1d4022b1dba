//! Order and order item payloads.
//!
//! The orders API reports money as `{CurrencyCode, Amount}` with the amount
//! as a decimal string; [`Money::value`] parses it with a zero fallback the
//! way the importer expects.

use serde::Deserialize;

/// One marketplace order from the order list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Order {
    /// Marketplace order identifier.
    pub amazon_order_id: String,
    /// Order status (`Pending`, `Shipped`, `Canceled`, ...).
    pub order_status: String,
    /// Fulfillment channel: `AFN` (FBA) or `MFN` (merchant).
    pub fulfillment_channel: Option<String>,
    /// Purchase timestamp, RFC3339 UTC.
    pub purchase_date: Option<String>,
    /// Latest promised ship timestamp, RFC3339 UTC.
    pub latest_ship_date: Option<String>,
    /// Destination address, city-level only for FBA orders.
    pub shipping_address: Option<OrderAddress>,
}

impl Order {
    /// Whether this order was fulfilled by the FBA network.
    pub fn is_fba(&self) -> bool {
        self.fulfillment_channel.as_deref() == Some("AFN")
    }
}

/// Destination address of an order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderAddress {
    /// City name.
    #[serde(default)]
    pub city: String,
    /// State or region code.
    #[serde(default)]
    pub state_or_region: String,
    /// ZIP or postal code.
    #[serde(default)]
    pub postal_code: String,
    /// Two-letter country code.
    #[serde(default)]
    pub country_code: String,
}

/// One line item of an order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderItem {
    /// Catalog identifier.
    #[serde(rename = "ASIN")]
    pub asin: String,
    /// Merchant SKU.
    #[serde(rename = "SellerSKU")]
    pub seller_sku: Option<String>,
    /// Units ordered.
    #[serde(default)]
    pub quantity_ordered: i64,
    /// Extended item price for the line (unit price times quantity).
    pub item_price: Option<Money>,
    /// Tax collected on the item price.
    pub item_tax: Option<Money>,
    /// Promotional discount applied to the line.
    pub promotional_discount: Option<Money>,
    /// Tax portion of the promotional discount.
    pub promotional_discount_tax: Option<Money>,
    /// Shipping charged for the line.
    pub shipping_price: Option<Money>,
    /// Tax collected on shipping.
    pub shipping_tax: Option<Money>,
    /// Shipping discount applied.
    pub shipping_discount: Option<Money>,
    /// Tax portion of the shipping discount.
    pub shipping_discount_tax: Option<Money>,
}

/// A currency amount as the orders API reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Money {
    /// ISO currency code.
    pub currency_code: Option<String>,
    /// Decimal amount as a string.
    pub amount: Option<String>,
}

impl Money {
    /// Parses the amount, treating missing or malformed values as zero.
    pub fn value(&self) -> f64 {
        self.amount
            .as_deref()
            .and_then(|a| a.trim().parse().ok())
            .unwrap_or(0.0)
    }
}

/// Parses an optional money field to a number with a zero fallback.
pub fn money_value(money: &Option<Money>) -> f64 {
    money.as_ref().map(Money::value).unwrap_or(0.0)
}
