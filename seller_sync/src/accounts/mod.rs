//! Account configuration: parsing, normalization, and loading.
//!
//! A TOML file describes every seller account the tool syncs:
//! marketplace, per-concern import toggles, and credentials. Credentials
//! are given either literally or by naming the environment variable that
//! holds the value (`*_env` fields), which keeps secrets out of the file.
//!
//! Key behaviors:
//! - Normalization enforces lowercase account codes and marketplace codes,
//!   trims whitespace, and rejects duplicate codes after normalization.
//! - Every account must name a known marketplace and a complete credential
//!   source (literal or env) for all three fields.
//!
//! Entrypoints:
//! - Parse + normalize from a TOML string: [`load_accounts_str`]
//! - Parse + normalize from a file path: [`load_accounts_path`]
//! - Runtime conversion: [`Account::from_cfg`] / [`runtime_accounts`]

use anyhow::{Context, bail};
use indexmap::IndexMap;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use spapi_ingestor::credentials::LwaCredentials;
use spapi_ingestor::marketplace::Marketplace;
use toml::from_str;

/// Top-level file mapping account codes to their configuration.
///
/// Keys are normalized to lowercase during normalization.
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AccountsFile {
    /// Map of account code -> configuration.
    pub accounts: IndexMap<String, AccountCfg>,
}

fn default_true() -> bool {
    true
}

/// Configuration payload for one account code.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AccountCfg {
    /// Marketplace code: "us" | "ca" | "mx".
    pub marketplace: String,
    /// Disabled accounts are listed in the overview but never synced.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Literal LWA client id.
    pub client_id: Option<String>,
    /// Literal LWA client secret. Prefer `client_secret_env`.
    pub client_secret: Option<String>,
    /// Literal LWA refresh token. Prefer `refresh_token_env`.
    pub refresh_token: Option<String>,
    /// Name of the environment variable holding the client id.
    pub client_id_env: Option<String>,
    /// Name of the environment variable holding the client secret.
    pub client_secret_env: Option<String>,
    /// Name of the environment variable holding the refresh token.
    pub refresh_token_env: Option<String>,

    /// Import products from the merchant listings report.
    #[serde(default)]
    pub import_products: bool,
    /// Also copy the listing price onto new and existing products.
    #[serde(default)]
    pub import_product_price: bool,
    /// Reconcile FBA inventory summaries.
    #[serde(default)]
    pub import_fba_inventory: bool,
    /// Import FBA inbound shipments as transfers.
    #[serde(default)]
    pub import_fba_inbound_shipments: bool,
    /// Import shipped FBA orders.
    #[serde(default)]
    pub import_fba_orders: bool,
    /// Book every FBA order on the shared `Amazon_FBA` partner.
    #[serde(default)]
    pub consolidated_fba_order_customer: bool,
    /// Derive and attach tax profiles on order lines.
    #[serde(default)]
    pub import_fba_order_tax: bool,
    /// Add a shipping line from the order's shipping charges.
    #[serde(default)]
    pub import_fba_order_shipping: bool,
    /// Create and post an invoice per imported order.
    #[serde(default)]
    pub invoice_fba_orders: bool,
    /// Reconcile AWD inventory.
    #[serde(default)]
    pub import_awd_inventory: bool,
    /// Import AWD inbound shipments as transfers.
    #[serde(default)]
    pub import_awd_inbound_shipments: bool,
    /// Refresh estimated fulfillment fees per listing.
    #[serde(default)]
    pub import_listing_fees: bool,
    /// Skip reconciling products without a cost.
    #[serde(default)]
    pub skip_inventory_when_no_product_cost: bool,
    /// Skip reconciling products not valued at average cost.
    #[serde(default)]
    pub skip_inventory_not_avco: bool,
}

impl AccountCfg {
    /// Resolves the credential triple, reading `*_env` indirections from
    /// the process environment.
    pub fn credentials(&self, code: &str) -> anyhow::Result<LwaCredentials> {
        let client_id = resolve_field(
            code,
            "client_id",
            self.client_id.as_deref(),
            self.client_id_env.as_deref(),
        )?;
        let client_secret = resolve_field(
            code,
            "client_secret",
            self.client_secret.as_deref(),
            self.client_secret_env.as_deref(),
        )?;
        let refresh_token = resolve_field(
            code,
            "refresh_token",
            self.refresh_token.as_deref(),
            self.refresh_token_env.as_deref(),
        )?;
        Ok(LwaCredentials::new(
            client_id,
            SecretString::from(client_secret),
            SecretString::from(refresh_token),
        ))
    }

    fn has_credential_source(&self, literal: &Option<String>, env: &Option<String>) -> bool {
        literal.is_some() || env.is_some()
    }
}

fn resolve_field(
    code: &str,
    field: &str,
    literal: Option<&str>,
    env_name: Option<&str>,
) -> anyhow::Result<String> {
    if let Some(value) = literal {
        return Ok(value.to_string());
    }
    if let Some(name) = env_name {
        return shared_utils::env::get_env_var(name)
            .with_context(|| format!("account {code}: {field} indirection"));
    }
    bail!("account {code}: neither {field} nor {field}_env is set");
}

/// What [`normalize_accounts`] cleaned up or flagged.
#[derive(Debug, Default)]
pub struct NormalizationReport {
    /// Number of account keys that changed when lowercasing/trimming.
    pub accounts_renamed: usize,
    /// Number of marketplace codes that changed when lowercasing/trimming.
    pub marketplaces_normalized: usize,
    /// Number of accounts with `enabled = false`.
    pub disabled: usize,
}

/// Normalize an accounts file in-place.
///
/// What normalization does:
/// - Lowercase + trim account codes; reject duplicates after normalization
/// - Lowercase + trim marketplace codes and verify they parse
/// - Verify every account has a complete credential source
///
/// Errors:
/// - Empty or duplicate account codes after normalization
/// - Unknown marketplace code
/// - Missing credential field with no env indirection
pub fn normalize_accounts(file: &mut AccountsFile) -> anyhow::Result<NormalizationReport> {
    let mut report = NormalizationReport::default();

    let mut rebuilt: IndexMap<String, AccountCfg> = IndexMap::new();
    let old = std::mem::take(&mut file.accounts);

    for (raw_code, mut cfg) in old {
        let code = raw_code.trim().to_lowercase();
        if code.is_empty() {
            bail!("account code cannot be empty after trimming");
        }
        if code != raw_code {
            report.accounts_renamed += 1;
        }
        if rebuilt.contains_key(&code) {
            bail!("duplicate account code after normalization: {code}");
        }

        let marketplace = cfg.marketplace.trim().to_lowercase();
        if marketplace != cfg.marketplace {
            report.marketplaces_normalized += 1;
        }
        if marketplace.parse::<Marketplace>().is_err() {
            bail!(
                "account {code}: unknown marketplace '{}' (expected us, ca or mx)",
                cfg.marketplace
            );
        }
        cfg.marketplace = marketplace;

        if !cfg.has_credential_source(&cfg.client_id, &cfg.client_id_env)
            || !cfg.has_credential_source(&cfg.client_secret, &cfg.client_secret_env)
            || !cfg.has_credential_source(&cfg.refresh_token, &cfg.refresh_token_env)
        {
            bail!("account {code}: incomplete credentials (need literal or _env for all fields)");
        }

        if !cfg.enabled {
            report.disabled += 1;
        }
        rebuilt.insert(code, cfg);
    }

    file.accounts = rebuilt;
    Ok(report)
}

/// Parse and normalize an accounts file from a TOML string.
pub fn load_accounts_str(toml_str: &str) -> anyhow::Result<AccountsFile> {
    let mut file: AccountsFile = from_str(toml_str).context("failed to parse accounts TOML")?;
    let _report = normalize_accounts(&mut file).context("normalize_accounts failed")?;
    Ok(file)
}

/// Read an accounts TOML file from disk, parse, and normalize it.
pub fn load_accounts_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<AccountsFile> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read accounts file {}", path.as_ref().display()))?;
    load_accounts_str(&text)
}

/// Runtime view of one account: code, parsed marketplace, toggles, and the
/// credential sources needed to build a client.
#[derive(Debug, Clone)]
pub struct Account {
    /// Normalized account code.
    pub code: String,
    /// Parsed marketplace.
    pub marketplace: Marketplace,
    /// Whether the account is synced.
    pub enabled: bool,
    /// See [`AccountCfg::import_products`].
    pub import_products: bool,
    /// See [`AccountCfg::import_product_price`].
    pub import_product_price: bool,
    /// See [`AccountCfg::import_fba_inventory`].
    pub import_fba_inventory: bool,
    /// See [`AccountCfg::import_fba_inbound_shipments`].
    pub import_fba_inbound_shipments: bool,
    /// See [`AccountCfg::import_fba_orders`].
    pub import_fba_orders: bool,
    /// See [`AccountCfg::consolidated_fba_order_customer`].
    pub consolidated_fba_order_customer: bool,
    /// See [`AccountCfg::import_fba_order_tax`].
    pub import_fba_order_tax: bool,
    /// See [`AccountCfg::import_fba_order_shipping`].
    pub import_fba_order_shipping: bool,
    /// See [`AccountCfg::invoice_fba_orders`].
    pub invoice_fba_orders: bool,
    /// See [`AccountCfg::import_awd_inventory`].
    pub import_awd_inventory: bool,
    /// See [`AccountCfg::import_awd_inbound_shipments`].
    pub import_awd_inbound_shipments: bool,
    /// See [`AccountCfg::import_listing_fees`].
    pub import_listing_fees: bool,
    /// See [`AccountCfg::skip_inventory_when_no_product_cost`].
    pub skip_inventory_when_no_product_cost: bool,
    /// See [`AccountCfg::skip_inventory_not_avco`].
    pub skip_inventory_not_avco: bool,
    cfg: AccountCfg,
}

impl Account {
    /// Builds the runtime view from a normalized configuration entry.
    pub fn from_cfg(code: &str, cfg: &AccountCfg) -> anyhow::Result<Account> {
        let marketplace = cfg
            .marketplace
            .parse::<Marketplace>()
            .map_err(|e| anyhow::anyhow!("account {code}: {e}"))?;
        Ok(Account {
            code: code.to_string(),
            marketplace,
            enabled: cfg.enabled,
            import_products: cfg.import_products,
            import_product_price: cfg.import_product_price,
            import_fba_inventory: cfg.import_fba_inventory,
            import_fba_inbound_shipments: cfg.import_fba_inbound_shipments,
            import_fba_orders: cfg.import_fba_orders,
            consolidated_fba_order_customer: cfg.consolidated_fba_order_customer,
            import_fba_order_tax: cfg.import_fba_order_tax,
            import_fba_order_shipping: cfg.import_fba_order_shipping,
            invoice_fba_orders: cfg.invoice_fba_orders,
            import_awd_inventory: cfg.import_awd_inventory,
            import_awd_inbound_shipments: cfg.import_awd_inbound_shipments,
            import_listing_fees: cfg.import_listing_fees,
            skip_inventory_when_no_product_cost: cfg.skip_inventory_when_no_product_cost,
            skip_inventory_not_avco: cfg.skip_inventory_not_avco,
            cfg: cfg.clone(),
        })
    }

    /// Resolves this account's credential triple.
    pub fn credentials(&self) -> anyhow::Result<LwaCredentials> {
        self.cfg.credentials(&self.code)
    }
}

/// Runtime views for every account in a normalized file, in file order.
pub fn runtime_accounts(file: &AccountsFile) -> anyhow::Result<Vec<Account>> {
    file.accounts
        .iter()
        .map(|(code, cfg)| Account::from_cfg(code, cfg))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_toml() -> &'static str {
        r#"
[accounts.Main ]
marketplace = "US"
client_id = "amzn1.application-oa2-client.fff"
client_secret_env = "MAIN_LWA_SECRET"
refresh_token_env = "MAIN_LWA_REFRESH"
import_products = true
import_fba_inventory = true

[accounts.ca_shop]
marketplace = "ca"
enabled = false
client_id = "amzn1.application-oa2-client.eee"
client_secret = "secret"
refresh_token = "token"
"#
    }

    #[test]
    fn normalizes_codes_and_marketplaces() {
        let file = load_accounts_str(tiny_toml()).unwrap();
        let codes: Vec<&str> = file.accounts.keys().map(String::as_str).collect();
        assert_eq!(codes, vec!["main", "ca_shop"]);
        assert_eq!(file.accounts["main"].marketplace, "us");
        assert!(file.accounts["main"].import_products);
        assert!(!file.accounts["main"].import_fba_orders);
        assert!(!file.accounts["ca_shop"].enabled);
    }

    #[test]
    fn report_counts_changes() {
        let mut file: AccountsFile = toml::from_str(tiny_toml()).unwrap();
        let report = normalize_accounts(&mut file).unwrap();
        assert_eq!(report.accounts_renamed, 1);
        assert_eq!(report.marketplaces_normalized, 1);
        assert_eq!(report.disabled, 1);
    }

    #[test]
    fn duplicate_account_collision_errors() {
        let toml_str = r#"
[accounts.main]
marketplace = "us"
client_id = "a"
client_secret = "b"
refresh_token = "c"

[accounts." MAIN "]
marketplace = "us"
client_id = "a"
client_secret = "b"
refresh_token = "c"
"#;
        let err = load_accounts_str(toml_str).unwrap_err();
        assert!(format!("{err:#}").contains("duplicate account code"));
    }

    #[test]
    fn unknown_marketplace_errors() {
        let toml_str = r#"
[accounts.main]
marketplace = "jp"
client_id = "a"
client_secret = "b"
refresh_token = "c"
"#;
        let err = load_accounts_str(toml_str).unwrap_err();
        assert!(format!("{err:#}").contains("unknown marketplace"));
    }

    #[test]
    fn incomplete_credentials_error() {
        let toml_str = r#"
[accounts.main]
marketplace = "us"
client_id = "a"
refresh_token = "c"
"#;
        let err = load_accounts_str(toml_str).unwrap_err();
        assert!(format!("{err:#}").contains("incomplete credentials"));
    }

    #[test]
    fn runtime_account_carries_toggles() {
        let file = load_accounts_str(tiny_toml()).unwrap();
        let accounts = runtime_accounts(&file).unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].code, "main");
        assert_eq!(accounts[0].marketplace, Marketplace::Us);
        assert!(accounts[0].import_fba_inventory);
        assert!(!accounts[1].enabled);
    }

    mod env_indirection {
        use secrecy::ExposeSecret;
        use serial_test::serial;

        use super::*;

        #[test]
        #[serial]
        fn resolves_env_fields() {
            unsafe {
                std::env::set_var("MAIN_LWA_SECRET", "s3cret");
                std::env::set_var("MAIN_LWA_REFRESH", "r3fresh");
            }
            let file = load_accounts_str(tiny_toml()).unwrap();
            let account = Account::from_cfg("main", &file.accounts["main"]).unwrap();
            let creds = account.credentials().unwrap();
            assert_eq!(creds.client_id, "amzn1.application-oa2-client.fff");
            assert_eq!(creds.client_secret.expose_secret(), "s3cret");
            assert_eq!(creds.refresh_token.expose_secret(), "r3fresh");
            unsafe {
                std::env::remove_var("MAIN_LWA_SECRET");
                std::env::remove_var("MAIN_LWA_REFRESH");
            }
        }

        #[test]
        #[serial]
        fn missing_env_var_is_contextual_error() {
            unsafe {
                std::env::remove_var("MAIN_LWA_SECRET");
                std::env::remove_var("MAIN_LWA_REFRESH");
            }
            let file = load_accounts_str(tiny_toml()).unwrap();
            let account = Account::from_cfg("main", &file.accounts["main"]).unwrap();
            let err = account.credentials().unwrap_err();
            assert!(format!("{err:#}").contains("client_secret"));
        }
    }
}
