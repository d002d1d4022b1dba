use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use diesel::SqliteConnection;
use seller_sync::accounts::{self, Account};
use seller_sync::db::{connection, migrate};
use seller_sync::ledger;
use seller_sync::overview;
use seller_sync::registry::Registry;
use seller_sync::stock::SqliteStockService;
use seller_sync::sync::{
    awd_inbound, awd_inventory, fba_inbound, fba_inventory, fees, orders, products,
};
use spapi_ingestor::providers::SellerApi;
use spapi_ingestor::providers::sp_rest::SpRestClient;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Amazon seller warehouse sync")]
struct Cli {
    /// SQLite database path; falls back to DATABASE_URL, then seller_sync.db.
    #[arg(long)]
    database: Option<String>,
    /// Account configuration file.
    #[arg(long, value_name = "FILE", default_value = "accounts.toml")]
    accounts: String,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Create the database schema and the warehouse registry.
    Init,
    /// Check that every account's credentials can reach the API.
    Verify,
    /// Print account, product, address and ledger-backlog counts.
    Overview,
    /// Import merchant listings as products.
    Products,
    /// Reconcile FBA inventory levels.
    FbaInventory,
    /// Reconcile AWD inventory levels.
    AwdInventory,
    /// Import FBA inbound shipments as stock transfers.
    FbaInbound,
    /// Import AWD inbound shipments as stock transfers.
    AwdInbound,
    /// Import shipped FBA orders.
    Orders,
    /// Refresh listing fee estimates.
    Fees,
    /// Fetch and store new inventory ledger events.
    LedgerFetch,
    /// Book stored ledger events as stock transfers.
    LedgerApply,
    /// Run every concern each account opts into.
    SyncAll,
}

impl Cmd {
    fn concerns(&self) -> &'static [Concern] {
        match self {
            Cmd::Products => &[Concern::Products],
            Cmd::FbaInventory => &[Concern::FbaInventory],
            Cmd::AwdInventory => &[Concern::AwdInventory],
            Cmd::FbaInbound => &[Concern::FbaInbound],
            Cmd::AwdInbound => &[Concern::AwdInbound],
            Cmd::Orders => &[Concern::Orders],
            Cmd::Fees => &[Concern::Fees],
            Cmd::LedgerFetch => &[Concern::LedgerFetch],
            Cmd::LedgerApply => &[Concern::LedgerApply],
            Cmd::SyncAll => SYNC_ALL,
            Cmd::Init | Cmd::Verify | Cmd::Overview => &[],
        }
    }
}

/// One independently runnable sync pass.
#[derive(Debug, Clone, Copy)]
enum Concern {
    Products,
    FbaInventory,
    AwdInventory,
    FbaInbound,
    AwdInbound,
    Orders,
    Fees,
    LedgerFetch,
    LedgerApply,
}

/// `sync-all` order. Inventory snapshots run last so reconciliation sees
/// everything the movement passes booked.
const SYNC_ALL: &[Concern] = &[
    Concern::Products,
    Concern::FbaInbound,
    Concern::AwdInbound,
    Concern::LedgerFetch,
    Concern::LedgerApply,
    Concern::Orders,
    Concern::FbaInventory,
    Concern::AwdInventory,
    Concern::Fees,
];

impl Concern {
    fn name(self) -> &'static str {
        match self {
            Concern::Products => "products",
            Concern::FbaInventory => "fba-inventory",
            Concern::AwdInventory => "awd-inventory",
            Concern::FbaInbound => "fba-inbound",
            Concern::AwdInbound => "awd-inbound",
            Concern::Orders => "orders",
            Concern::Fees => "fees",
            Concern::LedgerFetch => "ledger-fetch",
            Concern::LedgerApply => "ledger-apply",
        }
    }

    /// Whether the account's toggles opt in to this pass. The ledger
    /// concerns ride the FBA inventory toggle.
    fn wanted(self, account: &Account) -> bool {
        match self {
            Concern::Products => account.import_products,
            Concern::FbaInventory => account.import_fba_inventory,
            Concern::AwdInventory => account.import_awd_inventory,
            Concern::FbaInbound => account.import_fba_inbound_shipments,
            Concern::AwdInbound => account.import_awd_inbound_shipments,
            Concern::Orders => account.import_fba_orders,
            Concern::Fees => account.import_listing_fees,
            Concern::LedgerFetch | Concern::LedgerApply => account.import_fba_inventory,
        }
    }
}

fn client_for(account: &Account) -> Result<SpRestClient> {
    let client = SpRestClient::new(account.credentials()?, account.marketplace)
        .with_context(|| format!("building client for account {}", account.code))?;
    Ok(client)
}

async fn sync_account(
    conn: &mut SqliteConnection,
    registry: &Registry,
    service: &SqliteStockService,
    account: &Account,
    concern: Concern,
) -> Result<String> {
    let api = client_for(account)?;
    let summary = match concern {
        Concern::Products => products::sync_products(conn, &api, account)
            .await?
            .to_string(),
        Concern::FbaInventory => {
            fba_inventory::sync_fba_inventory(conn, &api, account, service, registry)
                .await?
                .to_string()
        }
        Concern::AwdInventory => {
            awd_inventory::sync_awd_inventory(conn, &api, account, service, registry)
                .await?
                .to_string()
        }
        Concern::FbaInbound => {
            fba_inbound::sync_fba_inbound(conn, &api, account, service, registry)
                .await?
                .to_string()
        }
        Concern::AwdInbound => {
            awd_inbound::sync_awd_inbound(conn, &api, account, service, registry)
                .await?
                .to_string()
        }
        Concern::Orders => orders::sync_orders(conn, &api, account, service, registry)
            .await?
            .to_string(),
        Concern::Fees => fees::sync_fees(conn, &api, account).await?.to_string(),
        Concern::LedgerFetch => {
            let latest = ledger::latest_ledger_date(conn, &account.code)?;
            let (start, end) = ledger::fetch_window(latest, Utc::now().date_naive());
            debug!(account = %account.code, %start, %end, "fetching ledger window");
            let records = api.ledger_report(start, end).await?;
            ledger::ingest(conn, &account.code, &records)?.to_string()
        }
        Concern::LedgerApply => ledger::apply(conn, &account.code, service, &registry.fba)?
            .to_string(),
    };
    Ok(summary)
}

/// Runs the given passes for every enabled account that wants them.
///
/// An account failure is logged and counted but never stops the loop;
/// the error returned at the end makes the process exit non-zero.
async fn run_passes(
    conn: &mut SqliteConnection,
    registry: &Registry,
    accounts: &[Account],
    concerns: &[Concern],
) -> Result<()> {
    let service = SqliteStockService;
    let mut failed = 0usize;

    for &concern in concerns {
        for account in accounts.iter().filter(|a| a.enabled) {
            if !concern.wanted(account) {
                continue;
            }
            match sync_account(conn, registry, &service, account, concern).await {
                Ok(summary) => {
                    info!(account = %account.code, concern = concern.name(), "{summary}");
                }
                Err(e) => {
                    error!(account = %account.code, concern = concern.name(), error = ?e, "pass failed");
                    failed += 1;
                }
            }
        }
    }

    if failed > 0 {
        bail!("{failed} sync pass(es) failed");
    }
    Ok(())
}

async fn verify_account(account: &Account) -> Result<usize> {
    let api = client_for(account)?;
    let participations = api.marketplace_participations().await?;
    Ok(participations.len())
}

fn database_url(flag: Option<String>) -> String {
    flag.unwrap_or_else(|| shared_utils::env::get_env_var_or("DATABASE_URL", "seller_sync.db"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let cli = Cli::parse();
    let db_url = database_url(cli.database);
    migrate::run(&db_url)?;
    let mut conn = connection::connect_sqlite(&db_url)?;
    let registry = Registry::init(&mut conn)?;

    match cli.cmd {
        Cmd::Init => {
            println!("database ready at {db_url}");
        }
        Cmd::Verify => {
            let file = accounts::load_accounts_path(&cli.accounts)?;
            let mut failed = 0usize;
            for account in &accounts::runtime_accounts(&file)? {
                if !account.enabled {
                    println!("{}: skipped (disabled)", account.code);
                    continue;
                }
                match verify_account(account).await {
                    Ok(n) => println!("{}: ok ({n} marketplace participations)", account.code),
                    Err(e) => {
                        println!("{}: failed ({e:#})", account.code);
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                bail!("{failed} account(s) failed verification");
            }
        }
        Cmd::Overview => {
            let file = accounts::load_accounts_path(&cli.accounts)?;
            println!("{}", overview::gather(&mut conn, &file)?);
        }
        cmd => {
            let file = accounts::load_accounts_path(&cli.accounts)?;
            let accounts = accounts::runtime_accounts(&file)?;
            run_passes(&mut conn, &registry, &accounts, cmd.concerns()).await?;
        }
    }

    Ok(())
}
