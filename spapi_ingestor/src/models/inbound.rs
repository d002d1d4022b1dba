//! FBA and AWD inbound shipment payloads.
//!
//! The FBA inbound API uses PascalCase keys; AWD uses camelCase. Both carry
//! an origin address that the sync engine resolves through the address map.

use serde::Deserialize;

/// One FBA inbound shipment from the shipment list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InboundShipment {
    /// External shipment identifier.
    pub shipment_id: String,
    /// Seller-assigned shipment name.
    pub shipment_name: Option<String>,
    /// Current shipment status (`WORKING`, `SHIPPED`, `RECEIVING`,
    /// `CLOSED`, `CANCELLED`, ...).
    pub shipment_status: String,
    /// Address the shipment was sent from.
    pub ship_from_address: Option<ShipFromAddress>,
}

impl InboundShipment {
    /// Whether the remote side reports this shipment as cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.shipment_status.as_str(), "CANCELLED" | "DELETED")
    }
}

/// Origin address of an FBA inbound shipment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShipFromAddress {
    /// Contact name.
    #[serde(default)]
    pub name: String,
    /// Primary address line.
    #[serde(default)]
    pub address_line1: String,
    /// Secondary address line.
    #[serde(default)]
    pub address_line2: Option<String>,
    /// City name.
    #[serde(default)]
    pub city: String,
    /// State or province code.
    #[serde(default)]
    pub state_or_province_code: String,
    /// ZIP or postal code.
    #[serde(default)]
    pub postal_code: String,
    /// Two-letter country code.
    #[serde(default)]
    pub country_code: String,
}

/// One line item of an FBA inbound shipment.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InboundShipmentItem {
    /// Shipment the item belongs to.
    pub shipment_id: Option<String>,
    /// Merchant SKU.
    #[serde(rename = "SellerSKU")]
    pub seller_sku: String,
    /// Fulfillment network SKU.
    #[serde(rename = "FulfillmentNetworkSKU")]
    pub fulfillment_network_sku: Option<String>,
    /// Units the seller shipped.
    #[serde(default)]
    pub quantity_shipped: f64,
    /// Units the fulfillment center has received so far.
    pub quantity_received: Option<f64>,
}

/// One AWD inbound shipment from the shipment list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwdShipmentSummary {
    /// External shipment identifier.
    pub shipment_id: String,
    /// Current shipment status.
    #[serde(default)]
    pub shipment_status: String,
}

/// Full AWD inbound shipment detail.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwdShipmentDetail {
    /// External shipment identifier.
    pub shipment_id: String,
    /// Current shipment status.
    #[serde(default)]
    pub shipment_status: String,
    /// Address the shipment originates from.
    pub origin_address: Option<AwdAddress>,
    /// Package counts with their contents.
    #[serde(default)]
    pub shipment_container_quantities: Vec<ContainerQuantity>,
}

impl AwdShipmentDetail {
    /// Whether the remote side reports this shipment as cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.shipment_status == "CANCELLED"
    }
}

/// Origin address of an AWD inbound shipment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwdAddress {
    /// Contact name.
    #[serde(default)]
    pub name: String,
    /// Primary address line.
    #[serde(default)]
    pub address_line1: String,
    /// Secondary address line.
    #[serde(default)]
    pub address_line2: Option<String>,
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

/// A container count plus the package contents repeated in each container.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerQuantity {
    /// Number of identical containers.
    #[serde(default)]
    pub count: u32,
    /// Contents of one container.
    pub distribution_package: Option<DistributionPackage>,
}

/// Contents wrapper of a distribution package.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionPackage {
    /// Products inside the package.
    pub contents: Option<PackageContents>,
}

/// Product list inside a package.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageContents {
    /// Products with quantity and identifying attributes.
    #[serde(default)]
    pub products: Vec<DistributionProduct>,
}

/// One product line inside a distribution package.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionProduct {
    /// Merchant SKU, when reported.
    pub sku: Option<String>,
    /// Units of this product per container.
    #[serde(default)]
    pub quantity: f64,
    /// Identifying attributes (`ASIN`, `UPC`, ...).
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
}

impl DistributionProduct {
    /// The product's ASIN attribute, when present.
    pub fn asin(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case("asin"))
            .map(|a| a.value.as_str())
    }
}

/// Name/value attribute of a packaged product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAttribute {
    /// Attribute name.
    pub name: String,
    /// Attribute value.
    pub value: String,
}
