use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, NaiveTime, SecondsFormat, Utc};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::credentials::LwaCredentials;
use crate::errors::{ClientInitError, IngestorError};
use crate::marketplace::Marketplace;
use crate::models::catalog::CatalogItem;
use crate::models::fees::FeesEstimateResult;
use crate::models::inbound::{
    AwdShipmentDetail, AwdShipmentSummary, InboundShipment, InboundShipmentItem,
};
use crate::models::inventory::{AwdInventoryItem, InventorySummary};
use crate::models::ledger::LedgerRecord;
use crate::models::listings::ListingRow;
use crate::models::orders::{Order, OrderItem};
use crate::models::reports::{
    CreateReportResponse, CreateReportSpec, ProcessingStatus, Report, ReportDocument,
};
use crate::models::sellers::Participation;
use crate::providers::SellerApi;
use crate::providers::sp_rest::auth::TokenCache;
use crate::providers::sp_rest::reports::{
    REPORT_POLL_INTERVAL, REPORT_POLL_MAX_ATTEMPTS, REPORTS_PATH, decode_document, parse_tsv,
};
use crate::providers::sp_rest::response::{
    AwdInventoryResponse, AwdShipmentListResponse, FeesEstimatePayload,
    InventorySummariesResponse, OrderItemsPayload, OrdersPayload, Payload, ShipmentItemsPayload,
    ShipmentsPayload,
};

const LISTINGS_REPORT_TYPE: &str = "GET_MERCHANT_LISTINGS_DATA";
const LEDGER_REPORT_TYPE: &str = "GET_LEDGER_DETAIL_VIEW_DATA";

const FBA_INVENTORY_PATH: &str = "/fba/inventory/v1/summaries";
const FBA_INBOUND_PATH: &str = "/fba/inbound/v0/shipments";
const AWD_INVENTORY_PATH: &str = "/awd/2024-05-09/inventory";
const AWD_INBOUND_PATH: &str = "/awd/2024-05-09/inboundShipments";
const ORDERS_PATH: &str = "/orders/v0/orders";
const CATALOG_PATH: &str = "/catalog/2022-04-01/items";
const SELLERS_PATH: &str = "/sellers/v1/marketplaceParticipations";

/// REST client bound to one account and one marketplace.
///
/// The client carries its own token cache and rate limiters, so one
/// instance should be built per account and reused across calls.
pub struct SpRestClient {
    client: Client,
    credentials: LwaCredentials,
    marketplace: Marketplace,
    endpoint: String,
    tokens: TokenCache,
    report_limiter: DefaultDirectRateLimiter,
    data_limiter: DefaultDirectRateLimiter,
}

impl SpRestClient {
    /// Builds a client for the given account credentials and marketplace.
    pub fn new(
        credentials: LwaCredentials,
        marketplace: Marketplace,
    ) -> Result<Self, ClientInitError> {
        let client = Client::builder()
            .user_agent(concat!("spapi_ingestor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            credentials,
            marketplace,
            endpoint: marketplace.endpoint().to_string(),
            tokens: TokenCache::new(),
            // Report creation and polling share a much tighter bucket than
            // the plain data endpoints.
            report_limiter: RateLimiter::direct(Quota::per_minute(nonzero!(30u32))),
            data_limiter: RateLimiter::direct(Quota::per_second(nonzero!(2u32))),
        })
    }

    /// Builds a client with credentials taken from the environment.
    ///
    /// Reads `LWA_CLIENT_ID`, `LWA_CLIENT_SECRET` and `LWA_REFRESH_TOKEN`.
    pub fn from_env(marketplace: Marketplace) -> Result<Self, ClientInitError> {
        Self::new(LwaCredentials::from_env()?, marketplace)
    }

    /// Marketplace this client is bound to.
    pub fn marketplace(&self) -> Marketplace {
        self.marketplace
    }

    /// Drops the cached access token so the next call re-authenticates.
    pub async fn clear_token_cache(&self) {
        self.tokens.clear().await;
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, IngestorError> {
        self.data_limiter.until_ready().await;
        let token = self
            .tokens
            .access_token(&self.client, &self.credentials)
            .await?;
        let url = format!("{}{}", self.endpoint, path);
        debug!(%path, "GET");
        let response = self
            .client
            .get(&url)
            .header("x-amz-access-token", token)
            .query(query)
            .send()
            .await?;
        Self::decode_response(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, IngestorError> {
        self.data_limiter.until_ready().await;
        let token = self
            .tokens
            .access_token(&self.client, &self.credentials)
            .await?;
        let url = format!("{}{}", self.endpoint, path);
        debug!(%path, "POST");
        let response = self
            .client
            .post(&url)
            .header("x-amz-access-token", token)
            .json(body)
            .send()
            .await?;
        Self::decode_response(response).await
    }

    async fn decode_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, IngestorError> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(IngestorError::Api { status, body });
        }
        Ok(response.json::<T>().await?)
    }

    /// Requests a report, waits for it to finish and parses the document
    /// into rows keyed by the header line.
    async fn fetch_report(
        &self,
        report_type: &str,
        data_start_time: Option<DateTime<Utc>>,
        data_end_time: Option<DateTime<Utc>>,
    ) -> Result<Vec<indexmap::IndexMap<String, String>>, IngestorError> {
        let spec = CreateReportSpec {
            report_type: report_type.to_string(),
            marketplace_ids: vec![self.marketplace.id().to_string()],
            data_start_time: data_start_time.map(rfc3339),
            data_end_time: data_end_time.map(rfc3339),
        };

        self.report_limiter.until_ready().await;
        let created: CreateReportResponse = self
            .post_json(&format!("{REPORTS_PATH}/reports"), &spec)
            .await?;
        info!(report_type, report_id = %created.report_id, "report requested");

        let mut attempts: u32 = 0;
        let report = loop {
            attempts += 1;
            if attempts > REPORT_POLL_MAX_ATTEMPTS {
                return Err(IngestorError::ReportTimeout {
                    report_type: report_type.to_string(),
                    attempts: REPORT_POLL_MAX_ATTEMPTS,
                });
            }
            tokio::time::sleep(REPORT_POLL_INTERVAL).await;

            self.report_limiter.until_ready().await;
            let report: Report = self
                .get_json(
                    &format!("{REPORTS_PATH}/reports/{}", created.report_id),
                    &[],
                )
                .await?;
            if report.processing_status.is_terminal() {
                break report;
            }
            debug!(
                report_type,
                status = report.processing_status.as_str(),
                attempts,
                "report not ready"
            );
        };

        if report.processing_status != ProcessingStatus::Done {
            return Err(IngestorError::ReportFailed {
                report_type: report_type.to_string(),
                status: report.processing_status.as_str().to_string(),
            });
        }
        let document_id = report.report_document_id.ok_or_else(|| {
            IngestorError::Decode("finished report carries no document id".to_string())
        })?;

        self.report_limiter.until_ready().await;
        let document: ReportDocument = self
            .get_json(&format!("{REPORTS_PATH}/documents/{document_id}"), &[])
            .await?;

        // The document URL is pre-signed; no access token on this request.
        let response = self.client.get(&document.url).send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(IngestorError::Api { status, body });
        }
        let bytes = response.bytes().await?;
        let text = decode_document(&bytes, document.is_gzip())?;
        let rows = parse_tsv(&text)?;
        info!(report_type, rows = rows.len(), "report downloaded");
        Ok(rows)
    }
}

fn rfc3339(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[async_trait]
impl SellerApi for SpRestClient {
    async fn marketplace_participations(&self) -> Result<Vec<Participation>, IngestorError> {
        let response: Payload<Vec<Participation>> = self.get_json(SELLERS_PATH, &[]).await?;
        Ok(response.payload)
    }

    async fn open_listings(&self) -> Result<Vec<ListingRow>, IngestorError> {
        let rows = self.fetch_report(LISTINGS_REPORT_TYPE, None, None).await?;
        let listings: Vec<ListingRow> = rows.iter().filter_map(ListingRow::from_record).collect();
        if listings.len() < rows.len() {
            warn!(
                dropped = rows.len() - listings.len(),
                "listing rows without asin or sku dropped"
            );
        }
        Ok(listings)
    }

    async fn catalog_item(&self, asin: &str) -> Result<CatalogItem, IngestorError> {
        self.get_json(
            &format!("{CATALOG_PATH}/{asin}"),
            &[
                ("marketplaceIds", self.marketplace.id().to_string()),
                ("includedData", "summaries,attributes".to_string()),
            ],
        )
        .await
    }

    async fn fba_inventory_summaries(&self) -> Result<Vec<InventorySummary>, IngestorError> {
        let mut summaries = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut query = vec![
                ("granularityType", "Marketplace".to_string()),
                ("granularityId", self.marketplace.id().to_string()),
                ("marketplaceIds", self.marketplace.id().to_string()),
                ("details", "true".to_string()),
            ];
            if let Some(token) = &next_token {
                query.push(("nextToken", token.clone()));
            }

            let response: InventorySummariesResponse =
                self.get_json(FBA_INVENTORY_PATH, &query).await?;
            summaries.extend(response.payload.inventory_summaries);

            match response.pagination.and_then(|p| p.next_token) {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }
        Ok(summaries)
    }

    async fn awd_inventory(&self) -> Result<Vec<AwdInventoryItem>, IngestorError> {
        let mut items = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut query = Vec::new();
            if let Some(token) = &next_token {
                query.push(("nextToken", token.clone()));
            }

            let response: AwdInventoryResponse = self.get_json(AWD_INVENTORY_PATH, &query).await?;
            items.extend(response.inventory);

            match response.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }
        Ok(items)
    }

    async fn fba_inbound_shipments(
        &self,
        updated_after: DateTime<Utc>,
    ) -> Result<Vec<InboundShipment>, IngestorError> {
        let mut shipments = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let query = match &next_token {
                None => vec![
                    ("QueryType", "DATE_RANGE".to_string()),
                    ("LastUpdatedAfter", rfc3339(updated_after)),
                    ("LastUpdatedBefore", rfc3339(Utc::now())),
                    ("MarketplaceId", self.marketplace.id().to_string()),
                ],
                Some(token) => vec![
                    ("QueryType", "NEXT_TOKEN".to_string()),
                    ("NextToken", token.clone()),
                    ("MarketplaceId", self.marketplace.id().to_string()),
                ],
            };

            let response: Payload<ShipmentsPayload> =
                self.get_json(FBA_INBOUND_PATH, &query).await?;
            shipments.extend(response.payload.shipment_data);

            match response.payload.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }
        Ok(shipments)
    }

    async fn fba_inbound_shipment_items(
        &self,
        shipment_id: &str,
    ) -> Result<Vec<InboundShipmentItem>, IngestorError> {
        let mut items = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut query = vec![("MarketplaceId", self.marketplace.id().to_string())];
            if let Some(token) = &next_token {
                query.push(("NextToken", token.clone()));
            }

            let response: Payload<ShipmentItemsPayload> = self
                .get_json(&format!("{FBA_INBOUND_PATH}/{shipment_id}/items"), &query)
                .await?;
            items.extend(response.payload.item_data);

            match response.payload.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }
        Ok(items)
    }

    async fn awd_inbound_shipments(&self) -> Result<Vec<AwdShipmentSummary>, IngestorError> {
        let mut shipments = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut query = Vec::new();
            if let Some(token) = &next_token {
                query.push(("nextToken", token.clone()));
            }

            let response: AwdShipmentListResponse = self.get_json(AWD_INBOUND_PATH, &query).await?;
            shipments.extend(response.shipments);

            match response.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }
        Ok(shipments)
    }

    async fn awd_inbound_shipment(
        &self,
        shipment_id: &str,
    ) -> Result<AwdShipmentDetail, IngestorError> {
        self.get_json(&format!("{AWD_INBOUND_PATH}/{shipment_id}"), &[])
            .await
    }

    async fn orders_updated_after(
        &self,
        after: DateTime<Utc>,
    ) -> Result<Vec<Order>, IngestorError> {
        let mut orders = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let query = match &next_token {
                None => vec![
                    ("MarketplaceIds", self.marketplace.id().to_string()),
                    ("LastUpdatedAfter", rfc3339(after)),
                ],
                Some(token) => vec![
                    ("MarketplaceIds", self.marketplace.id().to_string()),
                    ("NextToken", token.clone()),
                ],
            };

            let response: Payload<OrdersPayload> = self.get_json(ORDERS_PATH, &query).await?;
            orders.extend(response.payload.orders);

            match response.payload.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }
        Ok(orders)
    }

    async fn order_items(&self, order_id: &str) -> Result<Vec<OrderItem>, IngestorError> {
        let mut items = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut query = Vec::new();
            if let Some(token) = &next_token {
                query.push(("NextToken", token.clone()));
            }

            let response: Payload<OrderItemsPayload> = self
                .get_json(&format!("{ORDERS_PATH}/{order_id}/orderItems"), &query)
                .await?;
            items.extend(response.payload.order_items);

            match response.payload.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }
        Ok(items)
    }

    async fn fees_estimate(
        &self,
        asin: &str,
        price: f64,
        fulfilled_by_amazon: bool,
    ) -> Result<FeesEstimateResult, IngestorError> {
        let body = serde_json::json!({
            "FeesEstimateRequest": {
                "MarketplaceId": self.marketplace.id(),
                "IsAmazonFulfilled": fulfilled_by_amazon,
                "Identifier": format!("fees-{asin}"),
                "PriceToEstimateFees": {
                    "ListingPrice": {
                        "CurrencyCode": self.marketplace.currency(),
                        "Amount": price,
                    }
                }
            }
        });

        let response: Payload<FeesEstimatePayload> = self
            .post_json(
                &format!("/products/fees/v0/items/{asin}/feesEstimate"),
                &body,
            )
            .await?;
        Ok(response.payload.fees_estimate_result)
    }

    async fn ledger_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LedgerRecord>, IngestorError> {
        let start_time = start.and_time(NaiveTime::MIN).and_utc();
        // End bound is exclusive midnight of the following day so the last
        // requested day is fully covered.
        let end_time = end
            .checked_add_days(Days::new(1))
            .unwrap_or(end)
            .and_time(NaiveTime::MIN)
            .and_utc();

        let rows = self
            .fetch_report(LEDGER_REPORT_TYPE, Some(start_time), Some(end_time))
            .await?;
        Ok(rows.iter().map(LedgerRecord::from_record).collect())
    }
}
