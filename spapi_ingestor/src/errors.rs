use thiserror::Error;

use shared_utils::env::MissingEnvVarError;

/// Errors that can occur while constructing an API client.
#[derive(Debug, Error)]
pub enum ClientInitError {
    /// A credential environment variable is not set.
    #[error(transparent)]
    MissingEnvVar(#[from] MissingEnvVarError),

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors that can occur within a [`crate::providers::SellerApi`] implementation.
#[derive(Debug, Error)]
pub enum IngestorError {
    /// The request itself failed (connection refused, timeout, TLS).
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-success status with an error body.
    #[error("API error ({status}): {body}")]
    Api {
        /// HTTP status code of the failed response.
        status: u16,
        /// Response body as returned by the API.
        body: String,
    },

    /// Token exchange with the authorization server failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A requested report reached a terminal failure state (FATAL or
    /// CANCELLED). Callers treat this as "nothing to import this cycle".
    #[error("Report {report_type} ended in processing status {status}")]
    ReportFailed {
        /// The report type that was requested.
        report_type: String,
        /// Terminal processing status reported by the API.
        status: String,
    },

    /// A requested report never reached a terminal state within the bounded
    /// polling loop.
    #[error("Report {report_type} still processing after {attempts} polls")]
    ReportTimeout {
        /// The report type that was requested.
        report_type: String,
        /// Number of polls performed before giving up.
        attempts: u32,
    },

    /// A response payload or report document could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// A generic I/O error (report decompression).
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}
