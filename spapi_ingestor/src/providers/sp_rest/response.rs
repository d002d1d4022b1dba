//! Wire envelopes for REST responses.
//!
//! Most of the selling partner endpoints wrap their results in a `payload`
//! object; the newer AWD endpoints return the collection at the top level.
//! Pagination tokens live either next to the payload or inside it depending
//! on the endpoint generation, so each envelope models its own shape.

use serde::Deserialize;

use crate::models::fees::FeesEstimateResult;
use crate::models::inbound::{AwdShipmentSummary, InboundShipment, InboundShipmentItem};
use crate::models::inventory::{AwdInventoryItem, InventorySummary};
use crate::models::orders::{Order, OrderItem};

/// Generic `payload` wrapper used by the sellers and fees endpoints.
#[derive(Debug, Deserialize)]
pub struct Payload<T> {
    pub payload: T,
}

/// `GET /fba/inventory/v1/summaries`
#[derive(Debug, Deserialize)]
pub struct InventorySummariesResponse {
    #[serde(default)]
    pub payload: InventorySummariesPayload,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummariesPayload {
    #[serde(default)]
    pub inventory_summaries: Vec<InventorySummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub next_token: Option<String>,
}

/// `GET /awd/2024-05-09/inventory`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwdInventoryResponse {
    #[serde(default)]
    pub inventory: Vec<AwdInventoryItem>,
    pub next_token: Option<String>,
}

/// `GET /awd/2024-05-09/inboundShipments`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwdShipmentListResponse {
    #[serde(default)]
    pub shipments: Vec<AwdShipmentSummary>,
    pub next_token: Option<String>,
}

/// `GET /fba/inbound/v0/shipments`
#[derive(Debug, Deserialize)]
pub struct ShipmentsPayload {
    #[serde(rename = "ShipmentData", default)]
    pub shipment_data: Vec<InboundShipment>,
    #[serde(rename = "NextToken")]
    pub next_token: Option<String>,
}

/// `GET /fba/inbound/v0/shipments/{id}/items`
#[derive(Debug, Deserialize)]
pub struct ShipmentItemsPayload {
    #[serde(rename = "ItemData", default)]
    pub item_data: Vec<InboundShipmentItem>,
    #[serde(rename = "NextToken")]
    pub next_token: Option<String>,
}

/// `GET /orders/v0/orders`
#[derive(Debug, Deserialize)]
pub struct OrdersPayload {
    #[serde(rename = "Orders", default)]
    pub orders: Vec<Order>,
    #[serde(rename = "NextToken")]
    pub next_token: Option<String>,
}

/// `GET /orders/v0/orders/{id}/orderItems`
#[derive(Debug, Deserialize)]
pub struct OrderItemsPayload {
    #[serde(rename = "OrderItems", default)]
    pub order_items: Vec<OrderItem>,
    #[serde(rename = "NextToken")]
    pub next_token: Option<String>,
}

/// `POST /products/fees/v0/items/{asin}/feesEstimate`
#[derive(Debug, Deserialize)]
pub struct FeesEstimatePayload {
    #[serde(rename = "FeesEstimateResult")]
    pub fees_estimate_result: FeesEstimateResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_response_with_pagination() {
        let raw = r#"{
            "payload": {
                "inventorySummaries": [
                    {"asin": "B000TEST01", "fnSku": "X000ABC123", "sellerSku": "AB-1"}
                ]
            },
            "pagination": {"nextToken": "tok-2"}
        }"#;
        let parsed: InventorySummariesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.payload.inventory_summaries.len(), 1);
        assert_eq!(
            parsed.pagination.and_then(|p| p.next_token).as_deref(),
            Some("tok-2")
        );
    }

    #[test]
    fn orders_payload_without_next_token() {
        let raw = r#"{"payload": {"Orders": [], "LastUpdatedBefore": "2025-06-01T00:00:00Z"}}"#;
        let parsed: Payload<OrdersPayload> = serde_json::from_str(raw).unwrap();
        assert!(parsed.payload.orders.is_empty());
        assert!(parsed.payload.next_token.is_none());
    }

    #[test]
    fn awd_list_defaults_to_empty() {
        let parsed: AwdShipmentListResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.shipments.is_empty());
        assert!(parsed.next_token.is_none());
    }
}
