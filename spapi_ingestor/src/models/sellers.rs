//! Marketplace participation payloads, used for credential verification.

use serde::Deserialize;

/// One marketplace the seller participates in.
#[derive(Debug, Clone, Deserialize)]
pub struct Participation {
    /// Marketplace descriptor.
    pub marketplace: ParticipationMarketplace,
    /// Participation state.
    pub participation: ParticipationStatus,
}

/// Marketplace descriptor in a participation entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationMarketplace {
    /// Marketplace id.
    pub id: String,
    /// Two-letter country code.
    pub country_code: Option<String>,
    /// Display name.
    pub name: Option<String>,
}

/// Participation state in a participation entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationStatus {
    /// Whether the seller actively participates.
    #[serde(default)]
    pub is_participating: bool,
}
