//! Repository for the manual adjustment ledger.
//!
//! An adjustment takes the same investment row lock as the scheduler's
//! distribution step, so the cap clamp always observes post-adjustment
//! `earned_profit` and the two writers never interleave.

use crate::error::RepositoryError;
use crate::models::{Adjustment, AdjustmentType, Investment};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

const INVESTMENT_COLUMNS: &str =
    "id, user_id, plan_id, amount, rate, cadence, expected_profit, earned_profit, \
     status, is_paused, next_profit_date, start_date, end_date, created_at";

const ADJUSTMENT_COLUMNS: &str =
    "id, investment_id, amount, adjustment_type, reason, status, created_by, created_at";

pub struct AdjustmentRepository {
    pool: PgPool,
}

impl AdjustmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply a manual add/deduct against an investment's earned profit and
    /// the owner's wallet, writing the immutable adjustment row in the same
    /// database transaction.
    ///
    /// The stored amount is the applied delta: an `add` is clamped at
    /// `expected_profit`, a `deduct` is floored at zero earned profit and
    /// at the spendable balance.
    pub async fn create(
        &self,
        investment_id: Uuid,
        amount: Decimal,
        kind: AdjustmentType,
        reason: &str,
        created_by: Uuid,
    ) -> Result<Adjustment, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let investment = sqlx::query_as::<_, Investment>(&format!(
            r#"
            SELECT {INVESTMENT_COLUMNS}
            FROM investments
            WHERE id = $1
            FOR UPDATE
            "#,
        ))
        .bind(investment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            RepositoryError::NotFound(format!("Investment {} not found", investment_id))
        })?;

        let balance = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT balance
            FROM wallets
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(investment.user_id)
        .fetch_one(&mut *tx)
        .await?;

        let (applied, signed) = match kind {
            AdjustmentType::Add => {
                let applied = amount.min(investment.remaining_profit());
                (applied, applied)
            }
            AdjustmentType::Deduct => {
                let applied = amount.min(investment.earned_profit).min(balance);
                (applied, -applied)
            }
        };

        sqlx::query(
            r#"
            UPDATE wallets
            SET balance = balance + $2, total_profit = total_profit + $2, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(investment.user_id)
        .bind(signed)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE investments
            SET earned_profit = earned_profit + $2
            WHERE id = $1
            "#,
        )
        .bind(investment.id)
        .bind(signed)
        .execute(&mut *tx)
        .await?;

        let adjustment = sqlx::query_as::<_, Adjustment>(&format!(
            r#"
            INSERT INTO adjustments (investment_id, amount, adjustment_type, reason, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ADJUSTMENT_COLUMNS}
            "#,
        ))
        .bind(investment.id)
        .bind(applied)
        .bind(kind.as_str())
        .bind(reason)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(adjustment)
    }

    /// Adjustment history for an investment, newest first
    pub async fn list_for_investment(
        &self,
        investment_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Adjustment>, RepositoryError> {
        let adjustments = sqlx::query_as::<_, Adjustment>(&format!(
            r#"
            SELECT {ADJUSTMENT_COLUMNS}
            FROM adjustments
            WHERE investment_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(investment_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(adjustments)
    }
}
