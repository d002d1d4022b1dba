//! Embedded migration runner.

use anyhow::anyhow;
use diesel::{Connection, SqliteConnection, connection::SimpleConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

/// Diesel migrations compiled into the binary.
///
/// [`run`] applies any that are still pending.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Runs pending Diesel migrations on a SQLite database at the given path.
///
/// Sets the SQLite journal mode to WAL and applies all embedded migrations,
/// returning an error on failure. Bare file paths and `sqlite:`-prefixed
/// URLs are both accepted.
pub fn run(database_url: &str) -> anyhow::Result<()> {
    let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);
    let mut conn = SqliteConnection::establish(path)?;
    conn.batch_execute("PRAGMA journal_mode=WAL;")?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!(e))?;

    Ok(())
}
