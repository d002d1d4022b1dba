//! Operator-facing warehouse overview.
//!
//! A handful of counts that answer "is anything waiting on me": accounts
//! configured and enabled, products flagged for review, shipment origins
//! still unmapped, and the ledger backlog.

use std::fmt;

use diesel::SqliteConnection;
use diesel::prelude::*;

use crate::accounts::AccountsFile;
use crate::addresses;
use crate::ledger;
use crate::schema::products;

/// Snapshot of warehouse state for the `overview` command.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Overview {
    /// Accounts in the configuration file.
    pub accounts_configured: usize,
    /// Accounts with syncing enabled.
    pub accounts_enabled: usize,
    /// Products known locally.
    pub products: i64,
    /// Placeholder products awaiting operator review.
    pub products_needing_review: i64,
    /// Registered shipment origin addresses.
    pub addresses: i64,
    /// Origins still waiting for a location mapping.
    pub addresses_unmapped: i64,
    /// Ledger entries not yet booked as transfers.
    pub ledger_unprocessed: i64,
}

impl fmt::Display for Overview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Warehouse overview")?;
        writeln!(f, "------------------")?;
        writeln!(
            f,
            "accounts:        {} configured, {} enabled",
            self.accounts_configured, self.accounts_enabled
        )?;
        writeln!(
            f,
            "products:        {} ({} flagged for review)",
            self.products, self.products_needing_review
        )?;
        writeln!(
            f,
            "addresses:       {} registered, {} unmapped",
            self.addresses, self.addresses_unmapped
        )?;
        write!(f, "ledger backlog:  {} entries", self.ledger_unprocessed)
    }
}

/// Collects the overview counts.
pub fn gather(conn: &mut SqliteConnection, file: &AccountsFile) -> anyhow::Result<Overview> {
    let products_total = products::table.count().get_result::<i64>(conn)?;
    let needing_review = products::table
        .filter(products::needs_review.eq(true))
        .count()
        .get_result::<i64>(conn)?;

    Ok(Overview {
        accounts_configured: file.accounts.len(),
        accounts_enabled: file.accounts.values().filter(|a| a.enabled).count(),
        products: products_total,
        products_needing_review: needing_review,
        addresses: addresses::total_count(conn)?,
        addresses_unmapped: addresses::unmapped_count(conn)?,
        ledger_unprocessed: ledger::unprocessed_count(conn)?,
    })
}
