//! Login-with-Amazon token exchange and caching.
//!
//! Every API call carries a short-lived access token obtained from the
//! refresh token. Tokens are cached until shortly before expiry so that
//! paginated fetches do not hammer the token endpoint.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::credentials::LwaCredentials;
use crate::errors::IngestorError;

/// Token endpoint shared by every marketplace.
pub const LWA_TOKEN_URL: &str = "https://api.amazon.com/auth/o2/token";

/// Refresh this long before the advertised expiry to avoid using a token
/// that dies mid-request.
const EXPIRY_GRACE: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + EXPIRY_GRACE < self.expires_at
    }
}

/// Shared cache for one account's access token.
///
/// Cloning is cheap; clones share the cached token.
#[derive(Clone)]
pub struct TokenCache {
    token_url: String,
    cached: Arc<RwLock<Option<CachedToken>>>,
}

impl TokenCache {
    /// Cache backed by the production token endpoint.
    pub fn new() -> Self {
        Self::with_token_url(LWA_TOKEN_URL)
    }

    /// Cache backed by an alternate token endpoint. Used by tests.
    pub fn with_token_url(token_url: impl Into<String>) -> Self {
        Self {
            token_url: token_url.into(),
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Returns a valid access token, exchanging the refresh token when the
    /// cached one is absent or about to expire.
    pub async fn access_token(
        &self,
        client: &Client,
        credentials: &LwaCredentials,
    ) -> Result<String, IngestorError> {
        if let Some(token) = self.cached.read().await.as_ref() {
            if token.is_fresh() {
                return Ok(token.access_token.clone());
            }
        }

        let mut guard = self.cached.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(token) = guard.as_ref() {
            if token.is_fresh() {
                return Ok(token.access_token.clone());
            }
        }

        debug!(url = %self.token_url, "exchanging refresh token for access token");
        let response = client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", credentials.refresh_token.expose_secret()),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.expose_secret()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown token error".to_string());
            return Err(IngestorError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let parsed: TokenResponse = response.json().await?;
        let access_token = parsed.access_token.clone();
        *guard = Some(CachedToken {
            access_token: parsed.access_token,
            expires_at: Instant::now() + Duration::from_secs(parsed.expires_in),
        });
        Ok(access_token)
    }

    /// Drops any cached token so the next call re-authenticates.
    pub async fn clear(&self) {
        *self.cached.write().await = None;
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_fresh() {
        let token = CachedToken {
            access_token: "Atza|token".to_string(),
            expires_at: Instant::now() + Duration::from_secs(3600),
        };
        assert!(token.is_fresh());
    }

    #[test]
    fn token_inside_grace_window_is_stale() {
        let token = CachedToken {
            access_token: "Atza|token".to_string(),
            expires_at: Instant::now() + Duration::from_secs(10),
        };
        assert!(!token.is_fresh());
    }

    #[tokio::test]
    async fn clear_drops_cached_token() {
        let cache = TokenCache::new();
        *cache.cached.write().await = Some(CachedToken {
            access_token: "Atza|token".to_string(),
            expires_at: Instant::now() + Duration::from_secs(3600),
        });
        cache.clear().await;
        assert!(cache.cached.read().await.is_none());
    }
}
