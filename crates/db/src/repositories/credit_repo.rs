//! Repository for the `credit_balances` table.
//!
//! Balances are shared with purchase flows outside this system, so every
//! mutation is a single atomic statement. The debit is a conditional
//! UPDATE whose `balance >= amount` guard doubles as the
//! insufficient-funds check; there is no read-then-write anywhere.

use reelforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::credit::CreditBalance;

/// Provides atomic operations on user credit balances.
pub struct CreditRepo;

impl CreditRepo {
    /// Current balance for a user; `0` when no row exists yet.
    pub async fn balance(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT balance FROM credit_balances WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(pool)
                .await?;
        Ok(balance.unwrap_or(0))
    }

    /// Atomically add credits to a user's balance (upsert), returning the
    /// updated row.
    pub async fn credit(
        pool: &PgPool,
        user_id: DbId,
        amount: i64,
    ) -> Result<CreditBalance, sqlx::Error> {
        sqlx::query_as::<_, CreditBalance>(
            "INSERT INTO credit_balances (user_id, balance) VALUES ($1, $2)
             ON CONFLICT (user_id) DO UPDATE
             SET balance = credit_balances.balance + EXCLUDED.balance
             RETURNING user_id, balance, updated_at",
        )
        .bind(user_id)
        .bind(amount)
        .fetch_one(pool)
        .await
    }

    /// Atomically debit credits from a user's balance.
    ///
    /// Returns `false` when the balance is below `amount` (insufficient
    /// funds), an expected business outcome, not an error. Concurrent
    /// debits cannot lose updates: the row-level lock taken by the UPDATE
    /// serializes them and the guard re-evaluates under the lock.
    pub async fn debit(pool: &PgPool, user_id: DbId, amount: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE credit_balances SET balance = balance - $2
             WHERE user_id = $1 AND balance >= $2",
        )
        .bind(user_id)
        .bind(amount)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
