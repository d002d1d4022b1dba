//! Stock movement capability.
//!
//! Everything that changes on-hand quantities goes through the
//! [`StockMovementService`] trait: reconciliation, ledger application,
//! shipment import and order fulfilment all supply
//! source/destination/quantity triples and drive the transfer lifecycle
//! draft → confirmed → assigned → done. The service owns how movements are
//! persisted; [`SqliteStockService`] is the local warehouse implementation.
//!
//! A mid-sequence failure leaves the transfer in its intermediate state for
//! manual review; nothing rolls the lifecycle back automatically.

pub mod sqlite;

use std::fmt;

use diesel::SqliteConnection;

pub use sqlite::SqliteStockService;

/// One product line of a transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveLine {
    /// Product being moved.
    pub product_id: i32,
    /// Location the quantity leaves.
    pub source_location_id: i32,
    /// Location the quantity enters.
    pub dest_location_id: i32,
    /// Moved quantity, strictly positive.
    pub quantity: f64,
}

impl MoveLine {
    /// The same line with source and destination swapped.
    pub fn reversed(&self) -> MoveLine {
        MoveLine {
            product_id: self.product_id,
            source_location_id: self.dest_location_id,
            dest_location_id: self.source_location_id,
            quantity: self.quantity,
        }
    }
}

/// Transfer lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// Created, not yet confirmed.
    Draft,
    /// Confirmed, awaiting reservation.
    Confirmed,
    /// Quantities reserved, ready to validate.
    Assigned,
    /// Validated; stock levels updated.
    Done,
    /// Cancelled; no stock effect.
    Cancelled,
}

impl TransferState {
    /// Database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferState::Draft => "draft",
            TransferState::Confirmed => "confirmed",
            TransferState::Assigned => "assigned",
            TransferState::Done => "done",
            TransferState::Cancelled => "cancelled",
        }
    }

    /// Parses the database representation.
    pub fn parse(raw: &str) -> anyhow::Result<TransferState> {
        match raw {
            "draft" => Ok(TransferState::Draft),
            "confirmed" => Ok(TransferState::Confirmed),
            "assigned" => Ok(TransferState::Assigned),
            "done" => Ok(TransferState::Done),
            "cancelled" => Ok(TransferState::Cancelled),
            other => anyhow::bail!("unknown transfer state: {other}"),
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle to a persisted transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferHandle {
    /// Database id.
    pub id: i32,
    /// Unique reference.
    pub reference: String,
    /// Current lifecycle state.
    pub state: TransferState,
}

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while driving the transfer lifecycle.
pub enum TransferError {
    #[error("transfer {reference} is {actual}, expected {expected}")]
    /// Raised when a lifecycle step finds the transfer in the wrong state.
    StateConflict {
        /// The transfer's unique reference.
        reference: String,
        /// State the step requires.
        expected: TransferState,
        /// State the transfer is actually in.
        actual: TransferState,
    },
}

/// Capability seam for creating and progressing stock movements.
pub trait StockMovementService {
    /// Current on-hand quantity for a (product, location) pair; 0 when no
    /// level row exists.
    fn on_hand(
        &self,
        conn: &mut SqliteConnection,
        product_id: i32,
        location_id: i32,
    ) -> anyhow::Result<f64>;

    /// Looks up a transfer by its unique reference.
    fn find_transfer(
        &self,
        conn: &mut SqliteConnection,
        reference: &str,
    ) -> anyhow::Result<Option<TransferHandle>>;

    /// Lines of an existing transfer, for reversal synthesis.
    fn transfer_lines(
        &self,
        conn: &mut SqliteConnection,
        transfer_id: i32,
    ) -> anyhow::Result<Vec<MoveLine>>;

    /// Creates a draft transfer with the given lines. Every line quantity
    /// must be strictly positive and the line set non-empty.
    fn create_transfer(
        &self,
        conn: &mut SqliteConnection,
        reference: &str,
        lines: &[MoveLine],
    ) -> anyhow::Result<TransferHandle>;

    /// draft → confirmed.
    fn confirm(
        &self,
        conn: &mut SqliteConnection,
        handle: &mut TransferHandle,
    ) -> anyhow::Result<()>;

    /// confirmed → assigned.
    fn assign(
        &self,
        conn: &mut SqliteConnection,
        handle: &mut TransferHandle,
    ) -> anyhow::Result<()>;

    /// assigned → done; applies every line's delta to the stock levels.
    fn validate(
        &self,
        conn: &mut SqliteConnection,
        handle: &mut TransferHandle,
    ) -> anyhow::Result<()>;
}

/// Runs the whole lifecycle for a new transfer: create, confirm, assign,
/// validate. On failure the transfer stays in whatever state it reached.
pub fn execute_transfer(
    service: &dyn StockMovementService,
    conn: &mut SqliteConnection,
    reference: &str,
    lines: &[MoveLine],
) -> anyhow::Result<TransferHandle> {
    let mut handle = service.create_transfer(conn, reference, lines)?;
    service.confirm(conn, &mut handle)?;
    service.assign(conn, &mut handle)?;
    service.validate(conn, &mut handle)?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_swaps_endpoints_only() {
        let line = MoveLine {
            product_id: 7,
            source_location_id: 1,
            dest_location_id: 2,
            quantity: 4.0,
        };
        let rev = line.reversed();
        assert_eq!(rev.source_location_id, 2);
        assert_eq!(rev.dest_location_id, 1);
        assert_eq!(rev.quantity, 4.0);
        assert_eq!(rev.product_id, 7);
    }

    #[test]
    fn state_round_trips() {
        for state in [
            TransferState::Draft,
            TransferState::Confirmed,
            TransferState::Assigned,
            TransferState::Done,
            TransferState::Cancelled,
        ] {
            assert_eq!(TransferState::parse(state.as_str()).unwrap(), state);
        }
        assert!(TransferState::parse("shipped").is_err());
    }
}
