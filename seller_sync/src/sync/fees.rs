//! Estimated fulfillment fee refresh.
//!
//! For every priced product the account lists, asks the fees API what
//! fulfilling one unit would cost both ways (by Amazon, by merchant) and
//! stores the totals per (product, account). Estimates feed margin
//! reporting; failures are per-product and retried on the next run.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use diesel::prelude::*;
use diesel::{SqliteConnection, insert_into};
use spapi_ingestor::providers::SellerApi;
use tracing::{debug, warn};

use crate::accounts::Account;
use crate::models::NewListingFee;
use crate::schema::{listing_fees, product_asin_mskus, products};

/// Counters produced by one fee refresh run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FeeSyncStats {
    /// Products whose estimates were stored.
    pub updated: usize,
    /// Products without an ASIN or a positive price.
    pub skipped: usize,
    /// Products whose estimate requests failed.
    pub failed: usize,
}

impl fmt::Display for FeeSyncStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} updated, {} skipped, {} failed",
            self.updated, self.skipped, self.failed
        )
    }
}

/// Stores one product's estimates, replacing any previous row.
pub fn upsert_listing_fee(
    conn: &mut SqliteConnection,
    product_id_: i32,
    account_: &str,
    est_fba_fee_: Option<f64>,
    est_fbm_fee_: Option<f64>,
) -> anyhow::Result<()> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let row = NewListingFee {
        product_id: product_id_,
        account: account_,
        est_fba_fee: est_fba_fee_,
        est_fbm_fee: est_fbm_fee_,
        updated_at: &now,
    };
    insert_into(listing_fees::table)
        .values(&row)
        .on_conflict((listing_fees::product_id, listing_fees::account))
        .do_update()
        .set((
            listing_fees::est_fba_fee.eq(est_fba_fee_),
            listing_fees::est_fbm_fee.eq(est_fbm_fee_),
            listing_fees::updated_at.eq(&now),
        ))
        .execute(conn)?;
    Ok(())
}

/// Refreshes fee estimates for the account's priced products.
pub async fn sync_fees(
    conn: &mut SqliteConnection,
    api: &dyn SellerApi,
    account: &Account,
) -> anyhow::Result<FeeSyncStats> {
    let candidates = products::table
        .inner_join(product_asin_mskus::table)
        .filter(product_asin_mskus::account.eq(&account.code))
        .select((products::id, products::asin, products::price))
        .distinct()
        .load::<(i32, Option<String>, f64)>(conn)?;

    let mut stats = FeeSyncStats::default();
    for (product_id, asin, price) in candidates {
        let Some(asin) = asin else {
            stats.skipped += 1;
            continue;
        };
        if price <= 0.0 {
            stats.skipped += 1;
            continue;
        }

        let fba = api.fees_estimate(&asin, price, true).await;
        let fbm = api.fees_estimate(&asin, price, false).await;
        match (fba, fbm) {
            (Ok(fba), Ok(fbm)) => {
                upsert_listing_fee(
                    conn,
                    product_id,
                    &account.code,
                    fba.total_amount(),
                    fbm.total_amount(),
                )?;
                stats.updated += 1;
            }
            (fba, fbm) => {
                let error = fba.err().or(fbm.err());
                warn!(product_id, %asin, error = ?error, "fee estimate failed");
                stats.failed += 1;
            }
        }
    }

    debug!(account = %account.code, %stats, "fee sync finished");
    Ok(stats)
}
