//! Inventory ledger ingestion and application.
//!
//! The inventory ledger report is an append-only event stream: every unit
//! Amazon receives, moves, or removes shows up as one dated row. Syncing
//! it is a two-step pipeline:
//!
//! 1. [`ingest`] parses report rows and stores them in `ledger_entries`,
//!    deduplicating on the event's natural key so overlapping fetch
//!    windows are harmless.
//! 2. [`apply`] walks unprocessed entries in date order and books each
//!    supported event as a stock transfer, linking the entry to the
//!    transfer it produced. Unsupported event types stay unprocessed;
//!    other flows (orders, shipments) account for those units.
//!
//! Fetch windows overlap on purpose: the next window starts one day
//! before the newest stored entry, because Amazon keeps appending events
//! to a date for a while after it first appears.

use std::fmt;

use chrono::{Days, NaiveDate};
use diesel::prelude::*;
use diesel::{SqliteConnection, insert_into};
use spapi_ingestor::models::ledger::LedgerRecord;
use tracing::{debug, warn};

use crate::models::{LedgerEntry, NewLedgerEntry};
use crate::reconcile::QUANTITY_EPSILON;
use crate::registry::FbaWarehouse;
use crate::schema::ledger_entries;
use crate::stock::{MoveLine, StockMovementService, execute_transfer};
use crate::sync::resolve;

/// How far back the first fetch reaches when the ledger is empty.
const INITIAL_LOOKBACK_DAYS: u64 = 30;

/// Overlap with already-stored dates on subsequent fetches.
const REFETCH_OVERLAP_DAYS: u64 = 1;

/// Date format used by the ledger report.
const REPORT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Counters produced by one [`ingest`] run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Rows stored.
    pub inserted: usize,
    /// Rows already present under their natural key.
    pub skipped_duplicate: usize,
    /// Rows missing a date, FNSKU, or event type.
    pub dropped_invalid: usize,
}

impl fmt::Display for IngestStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} inserted, {} duplicates, {} invalid",
            self.inserted, self.skipped_duplicate, self.dropped_invalid
        )
    }
}

/// Counters produced by one [`apply`] run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ApplyStats {
    /// Entries booked as transfers.
    pub applied: usize,
    /// Entries with a quantity of zero.
    pub skipped_zero: usize,
    /// Entries whose event type this pipeline does not book.
    pub skipped_unsupported: usize,
}

impl fmt::Display for ApplyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} applied, {} zero-quantity, {} unsupported",
            self.applied, self.skipped_zero, self.skipped_unsupported
        )
    }
}

/// Newest stored ledger date for an account, if any.
pub fn latest_ledger_date(
    conn: &mut SqliteConnection,
    account: &str,
) -> anyhow::Result<Option<NaiveDate>> {
    let newest = ledger_entries::table
        .filter(ledger_entries::account.eq(account))
        .select(diesel::dsl::max(ledger_entries::ledger_date))
        .first::<Option<String>>(conn)?;
    match newest {
        Some(raw) => Ok(Some(raw.parse::<NaiveDate>()?)),
        None => Ok(None),
    }
}

/// Computes the next fetch window as an inclusive date range.
///
/// With stored history the window starts one day before the newest entry;
/// a fresh database reaches back [`INITIAL_LOOKBACK_DAYS`].
pub fn fetch_window(latest: Option<NaiveDate>, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = match latest {
        Some(newest) => newest
            .checked_sub_days(Days::new(REFETCH_OVERLAP_DAYS))
            .unwrap_or(newest),
        None => today
            .checked_sub_days(Days::new(INITIAL_LOOKBACK_DAYS))
            .unwrap_or(today),
    };
    (start.min(today), today)
}

/// Stores report rows, deduplicating on the event natural key.
///
/// The natural key is (account, date, fnsku, event type, reference id,
/// fulfillment center); blank reference ids and fulfillment centers
/// participate as empty strings. Rows missing a date, FNSKU, or event
/// type are dropped with a warning. The whole batch commits atomically.
pub fn ingest(
    conn: &mut SqliteConnection,
    account: &str,
    records: &[LedgerRecord],
) -> anyhow::Result<IngestStats> {
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let mut stats = IngestStats::default();

        for record in records {
            let Some(ledger_date) = parse_report_date(record.date.as_deref()) else {
                warn!(date = ?record.date, "dropping ledger row with unusable date");
                stats.dropped_invalid += 1;
                continue;
            };
            let Some(fnsku) = nonempty(record.fnsku.as_deref()) else {
                warn!(date = %ledger_date, "dropping ledger row without FNSKU");
                stats.dropped_invalid += 1;
                continue;
            };
            let Some(event_type) = nonempty(record.event_type.as_deref()) else {
                warn!(date = %ledger_date, fnsku, "dropping ledger row without event type");
                stats.dropped_invalid += 1;
                continue;
            };

            let date_iso = ledger_date.format("%Y-%m-%d").to_string();
            let reference_id = record.reference_id.as_deref().unwrap_or("");
            let fulfillment_center = record.fulfillment_center.as_deref().unwrap_or("");

            let existing = ledger_entries::table
                .filter(ledger_entries::account.eq(account))
                .filter(ledger_entries::ledger_date.eq(&date_iso))
                .filter(ledger_entries::fnsku.eq(fnsku))
                .filter(ledger_entries::event_type.eq(event_type))
                .filter(ledger_entries::reference_id.eq(reference_id))
                .filter(ledger_entries::fulfillment_center.eq(fulfillment_center))
                .select(ledger_entries::id)
                .first::<i32>(conn)
                .optional()?;
            if existing.is_some() {
                stats.skipped_duplicate += 1;
                continue;
            }

            let row = NewLedgerEntry {
                account,
                ledger_date: &date_iso,
                fnsku,
                asin: nonempty(record.asin.as_deref()),
                msku: nonempty(record.msku.as_deref()),
                title: nonempty(record.title.as_deref()),
                event_type,
                reference_id,
                quantity: record.quantity,
                fulfillment_center,
                disposition: nonempty(record.disposition.as_deref()),
                reason: nonempty(record.reason.as_deref()),
                country: nonempty(record.country.as_deref()),
            };
            insert_into(ledger_entries::table).values(&row).execute(conn)?;
            stats.inserted += 1;
        }

        debug!(account, %stats, "ledger ingest finished");
        Ok(stats)
    })
}

/// Books unprocessed ledger entries as stock transfers.
///
/// Entries are processed oldest first and each one commits on its own, so
/// a failure mid-run keeps everything already booked. A booked entry
/// carries the id of its transfer; re-running never books twice.
pub fn apply(
    conn: &mut SqliteConnection,
    account: &str,
    service: &dyn StockMovementService,
    fba: &FbaWarehouse,
) -> anyhow::Result<ApplyStats> {
    let entries = ledger_entries::table
        .filter(ledger_entries::account.eq(account))
        .filter(ledger_entries::transfer_id.is_null())
        .order((ledger_entries::ledger_date.asc(), ledger_entries::id.asc()))
        .select(LedgerEntry::as_select())
        .load::<LedgerEntry>(conn)?;

    let mut stats = ApplyStats::default();
    for entry in entries {
        if entry.quantity.abs() <= QUANTITY_EPSILON {
            debug!(entry_id = entry.id, "ledger entry has zero quantity");
            stats.skipped_zero += 1;
            continue;
        }
        let Some((source, dest)) = plan_entry_route(&entry, fba) else {
            stats.skipped_unsupported += 1;
            continue;
        };

        conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
            let product_id = resolve_entry_product(conn, &entry)?;
            let lines = [MoveLine {
                product_id,
                source_location_id: source,
                dest_location_id: dest,
                quantity: entry.quantity.abs(),
            }];
            let reference = format!("LEDGER/{}", entry.id);
            // A crash after transfer creation but before linking leaves a
            // transfer behind under this reference; adopt it instead of
            // booking the movement twice.
            let transfer = match service.find_transfer(conn, &reference)? {
                Some(handle) => handle,
                None => execute_transfer(service, conn, &reference, &lines)?,
            };
            diesel::update(ledger_entries::table.find(entry.id))
                .set(ledger_entries::transfer_id.eq(transfer.id))
                .execute(conn)?;
            Ok(())
        })?;
        stats.applied += 1;
    }

    debug!(account, %stats, "ledger apply finished");
    Ok(stats)
}

/// Number of ledger entries not yet booked as transfers.
pub fn unprocessed_count(conn: &mut SqliteConnection) -> anyhow::Result<i64> {
    let n = ledger_entries::table
        .filter(ledger_entries::transfer_id.is_null())
        .count()
        .get_result::<i64>(conn)?;
    Ok(n)
}

/// Source and destination for one entry, by event type.
///
/// Receipts book received units into stock. Warehouse transfers move
/// units between fulfillment centers; the departing (negative) event
/// returns units to the inbound bucket and the arriving (positive) event
/// books them back into stock, so paired events cancel.
fn plan_entry_route(entry: &LedgerEntry, fba: &FbaWarehouse) -> Option<(i32, i32)> {
    match entry.event_type.as_str() {
        "Receipts" => Some((fba.inbound, fba.stock)),
        "WhseTransfer" => {
            if entry.quantity > 0.0 {
                Some((fba.inbound, fba.stock))
            } else {
                Some((fba.stock, fba.inbound))
            }
        }
        _ => None,
    }
}

/// Resolves the product an entry refers to, creating a review-flagged
/// placeholder when neither the ASIN nor the FNSKU is known yet.
fn resolve_entry_product(conn: &mut SqliteConnection, entry: &LedgerEntry) -> anyhow::Result<i32> {
    if let Some(asin) = entry.asin.as_deref() {
        if let Some(id) = resolve::find_by_asin(conn, asin)? {
            attach_keys(conn, id, entry)?;
            return Ok(id);
        }
    }
    if let Some(id) = resolve::find_by_fnsku(conn, &entry.account, &entry.fnsku)? {
        return Ok(id);
    }

    let name = entry
        .title
        .as_deref()
        .or(entry.asin.as_deref())
        .unwrap_or(&entry.fnsku);
    let id = resolve::create_placeholder(conn, entry.asin.as_deref(), name, entry.msku.as_deref())?;
    attach_keys(conn, id, entry)?;
    Ok(id)
}

fn attach_keys(conn: &mut SqliteConnection, product_id: i32, entry: &LedgerEntry) -> anyhow::Result<()> {
    resolve::ensure_fnsku(conn, product_id, &entry.account, &entry.fnsku)?;
    if let Some(msku) = entry.msku.as_deref() {
        resolve::ensure_msku(conn, product_id, &entry.account, msku)?;
    }
    Ok(())
}

fn parse_report_date(raw: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw?.trim(), REPORT_DATE_FORMAT).ok()
}

fn nonempty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}
