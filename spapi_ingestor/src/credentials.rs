//! Login-with-Amazon credentials for one seller account.

use secrecy::SecretString;
use shared_utils::env::get_env_var;

use crate::errors::ClientInitError;

/// LWA application credentials plus the account's refresh token.
///
/// The client secret and refresh token are wrapped in [`SecretString`] so
/// they never appear in debug output or logs.
pub struct LwaCredentials {
    /// LWA application client id.
    pub client_id: String,
    /// LWA application client secret.
    pub client_secret: SecretString,
    /// Long-lived refresh token granted by the seller.
    pub refresh_token: SecretString,
}

impl LwaCredentials {
    /// Builds credentials from explicit values.
    pub fn new(client_id: String, client_secret: SecretString, refresh_token: SecretString) -> Self {
        Self {
            client_id,
            client_secret,
            refresh_token,
        }
    }

    /// Reads credentials from the `LWA_CLIENT_ID`, `LWA_CLIENT_SECRET` and
    /// `LWA_REFRESH_TOKEN` environment variables.
    pub fn from_env() -> Result<Self, ClientInitError> {
        Ok(Self {
            client_id: get_env_var("LWA_CLIENT_ID")?,
            client_secret: SecretString::new(get_env_var("LWA_CLIENT_SECRET")?.into()),
            refresh_token: SecretString::new(get_env_var("LWA_REFRESH_TOKEN")?.into()),
        })
    }
}

impl std::fmt::Debug for LwaCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LwaCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}
