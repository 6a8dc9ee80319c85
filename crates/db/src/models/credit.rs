//! Credit balance model.

use reelforge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `credit_balances` table.
///
/// Mutated only through atomic debit/credit statements, never
/// read-modify-write, because purchase flows update it concurrently
/// with the orchestrator's debits.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CreditBalance {
    pub user_id: DbId,
    pub balance: i64,
    pub updated_at: Timestamp,
}
