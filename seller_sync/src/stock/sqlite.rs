//! SQLite-backed stock movement service.

use anyhow::{Context, bail, ensure};
use diesel::insert_into;
use diesel::prelude::*;
use tracing::debug;

use crate::models::{NewTransfer, NewTransferMove, Transfer};
use crate::schema::{stock_levels, transfer_moves, transfers};
use crate::stock::{MoveLine, StockMovementService, TransferError, TransferHandle, TransferState};

/// Stateless service over the local `transfers` / `transfer_moves` /
/// `stock_levels` tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteStockService;

impl SqliteStockService {
    fn set_state(
        &self,
        conn: &mut SqliteConnection,
        handle: &mut TransferHandle,
        expected: TransferState,
        next: TransferState,
    ) -> anyhow::Result<()> {
        if handle.state != expected {
            return Err(TransferError::StateConflict {
                reference: handle.reference.clone(),
                expected,
                actual: handle.state,
            }
            .into());
        }
        diesel::update(transfers::table.find(handle.id))
            .set(transfers::state.eq(next.as_str()))
            .execute(conn)
            .with_context(|| format!("update transfer {} to {next}", handle.reference))?;
        handle.state = next;
        Ok(())
    }

    fn shift_level(
        &self,
        conn: &mut SqliteConnection,
        product_id: i32,
        location_id: i32,
        delta: f64,
    ) -> anyhow::Result<()> {
        insert_into(stock_levels::table)
            .values((
                stock_levels::product_id.eq(product_id),
                stock_levels::location_id.eq(location_id),
                stock_levels::quantity.eq(delta),
            ))
            .on_conflict((stock_levels::product_id, stock_levels::location_id))
            .do_update()
            .set(stock_levels::quantity.eq(stock_levels::quantity + delta))
            .execute(conn)?;
        Ok(())
    }
}

impl StockMovementService for SqliteStockService {
    fn on_hand(
        &self,
        conn: &mut SqliteConnection,
        product_id: i32,
        location_id: i32,
    ) -> anyhow::Result<f64> {
        let quantity = stock_levels::table
            .filter(stock_levels::product_id.eq(product_id))
            .filter(stock_levels::location_id.eq(location_id))
            .select(stock_levels::quantity)
            .first::<f64>(conn)
            .optional()?;
        Ok(quantity.unwrap_or(0.0))
    }

    fn find_transfer(
        &self,
        conn: &mut SqliteConnection,
        reference: &str,
    ) -> anyhow::Result<Option<TransferHandle>> {
        let row = transfers::table
            .filter(transfers::reference.eq(reference))
            .select(Transfer::as_select())
            .first::<Transfer>(conn)
            .optional()?;
        match row {
            Some(t) => Ok(Some(TransferHandle {
                id: t.id,
                reference: t.reference,
                state: TransferState::parse(&t.state)?,
            })),
            None => Ok(None),
        }
    }

    fn transfer_lines(
        &self,
        conn: &mut SqliteConnection,
        transfer_id: i32,
    ) -> anyhow::Result<Vec<MoveLine>> {
        let rows = transfer_moves::table
            .filter(transfer_moves::transfer_id.eq(transfer_id))
            .select((
                transfer_moves::product_id,
                transfer_moves::source_location_id,
                transfer_moves::dest_location_id,
                transfer_moves::quantity,
            ))
            .load::<(i32, i32, i32, f64)>(conn)?;
        Ok(rows
            .into_iter()
            .map(
                |(product_id, source_location_id, dest_location_id, quantity)| MoveLine {
                    product_id,
                    source_location_id,
                    dest_location_id,
                    quantity,
                },
            )
            .collect())
    }

    fn create_transfer(
        &self,
        conn: &mut SqliteConnection,
        reference: &str,
        lines: &[MoveLine],
    ) -> anyhow::Result<TransferHandle> {
        if lines.is_empty() {
            bail!("transfer {reference} has no lines");
        }
        for line in lines {
            ensure!(
                line.quantity > 0.0,
                "transfer {reference}: non-positive quantity {} for product {}",
                line.quantity,
                line.product_id
            );
        }

        let row = NewTransfer {
            reference,
            state: TransferState::Draft.as_str(),
        };
        let id = insert_into(transfers::table)
            .values(&row)
            .returning(transfers::id)
            .get_result::<i32>(conn)
            .with_context(|| format!("create transfer {reference}"))?;

        let move_rows: Vec<NewTransferMove> = lines
            .iter()
            .map(|line| NewTransferMove {
                transfer_id: id,
                product_id: line.product_id,
                source_location_id: line.source_location_id,
                dest_location_id: line.dest_location_id,
                quantity: line.quantity,
            })
            .collect();
        insert_into(transfer_moves::table)
            .values(&move_rows)
            .execute(conn)?;

        debug!(reference, lines = lines.len(), "transfer created");
        Ok(TransferHandle {
            id,
            reference: reference.to_string(),
            state: TransferState::Draft,
        })
    }

    fn confirm(
        &self,
        conn: &mut SqliteConnection,
        handle: &mut TransferHandle,
    ) -> anyhow::Result<()> {
        self.set_state(conn, handle, TransferState::Draft, TransferState::Confirmed)
    }

    fn assign(
        &self,
        conn: &mut SqliteConnection,
        handle: &mut TransferHandle,
    ) -> anyhow::Result<()> {
        self.set_state(
            conn,
            handle,
            TransferState::Confirmed,
            TransferState::Assigned,
        )
    }

    fn validate(
        &self,
        conn: &mut SqliteConnection,
        handle: &mut TransferHandle,
    ) -> anyhow::Result<()> {
        let lines = self.transfer_lines(conn, handle.id)?;
        self.set_state(conn, handle, TransferState::Assigned, TransferState::Done)?;
        for line in &lines {
            self.shift_level(conn, line.product_id, line.source_location_id, -line.quantity)?;
            self.shift_level(conn, line.product_id, line.dest_location_id, line.quantity)?;
        }
        debug!(reference = %handle.reference, "transfer validated");
        Ok(())
    }
}
