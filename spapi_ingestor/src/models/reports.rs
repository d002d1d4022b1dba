//! Report lifecycle payloads: create, poll, download.

use serde::{Deserialize, Serialize};

/// Request body for creating a report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportSpec {
    /// Report type identifier (e.g. `GET_MERCHANT_LISTINGS_DATA`).
    pub report_type: String,
    /// Marketplaces the report covers.
    pub marketplace_ids: Vec<String>,
    /// Inclusive start of the report data window, RFC3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_start_time: Option<String>,
    /// Inclusive end of the report data window, RFC3339.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_end_time: Option<String>,
}

/// Response to a report creation request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportResponse {
    /// Identifier used to poll the report status.
    pub report_id: String,
}

/// Processing status of a requested report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessingStatus {
    /// Waiting to be processed.
    InQueue,
    /// Currently being generated.
    InProgress,
    /// Finished; a document id is available.
    Done,
    /// Terminal failure on the remote side.
    Fatal,
    /// Cancelled remotely, no document will be produced.
    Cancelled,
}

impl ProcessingStatus {
    /// Whether this status terminates the polling loop.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProcessingStatus::Done | ProcessingStatus::Fatal | ProcessingStatus::Cancelled
        )
    }

    /// Wire representation, for error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::InQueue => "IN_QUEUE",
            ProcessingStatus::InProgress => "IN_PROGRESS",
            ProcessingStatus::Done => "DONE",
            ProcessingStatus::Fatal => "FATAL",
            ProcessingStatus::Cancelled => "CANCELLED",
        }
    }
}

/// Polled report state.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Current processing status.
    pub processing_status: ProcessingStatus,
    /// Document id, present once processing is done.
    pub report_document_id: Option<String>,
}

/// Metadata for a finished report document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    /// Pre-signed URL the document contents are fetched from.
    pub url: String,
    /// Compression applied to the document, `GZIP` when compressed.
    pub compression_algorithm: Option<String>,
}

impl ReportDocument {
    /// Whether the document payload must be gunzipped before parsing.
    pub fn is_gzip(&self) -> bool {
        self.compression_algorithm.as_deref() == Some("GZIP")
    }
}
