//! Repository for profit distributions.
//!
//! `apply_next` is the atomic unit of a scheduler tick: the distribution
//! row, the wallet credit, the `earned_profit` bump and the
//! `next_profit_date` advance commit together or not at all. The due
//! predicate is re-checked under `FOR UPDATE SKIP LOCKED`, which is both
//! the idempotency guard against double-pay and the per-investment mutual
//! exclusion between overlapping ticks.

use crate::error::RepositoryError;
use crate::models::{Investment, ProfitDistribution};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

const INVESTMENT_COLUMNS: &str =
    "id, user_id, plan_id, amount, rate, cadence, expected_profit, earned_profit, \
     status, is_paused, next_profit_date, start_date, end_date, created_at";

const DISTRIBUTION_COLUMNS: &str =
    "id, investment_id, amount, cadence, status, distributed_at, created_at";

/// Result of one distribution attempt against one investment
#[derive(Debug)]
pub enum DistributionOutcome {
    /// Payout credited; carries what the cascade and notifier need
    Distributed {
        distribution: ProfitDistribution,
        user_id: Uuid,
        amount: Decimal,
        investment_completed: bool,
    },
    /// Cap reached or term elapsed; investment completed without a payout
    Completed,
    /// No longer due, or another worker holds the row
    Skipped,
}

pub struct DistributionRepository {
    pool: PgPool,
}

impl DistributionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the next due payout for `investment_id`, if any.
    pub async fn apply_next(
        &self,
        investment_id: Uuid,
        now: NaiveDateTime,
    ) -> Result<DistributionOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Re-check the due predicate under the row lock; a rerun before
        // next_profit_date advances finds nothing and is a no-op
        let investment = sqlx::query_as::<_, Investment>(&format!(
            r#"
            SELECT {INVESTMENT_COLUMNS}
            FROM investments
            WHERE id = $1 AND status = 'active' AND is_paused = FALSE
              AND next_profit_date <= $2
            FOR UPDATE SKIP LOCKED
            "#,
        ))
        .bind(investment_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let investment = match investment {
            Some(i) => i,
            None => return Ok(DistributionOutcome::Skipped),
        };

        let payout = investment.clamped_payout();
        if investment.term_elapsed(now) || payout <= Decimal::ZERO {
            sqlx::query(
                r#"
                UPDATE investments
                SET status = 'completed', is_paused = FALSE
                WHERE id = $1
                "#,
            )
            .bind(investment.id)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            return Ok(DistributionOutcome::Completed);
        }

        let distribution = sqlx::query_as::<_, ProfitDistribution>(&format!(
            r#"
            INSERT INTO profit_distributions (investment_id, amount, cadence, status)
            VALUES ($1, $2, $3, 'pending')
            RETURNING {DISTRIBUTION_COLUMNS}
            "#,
        ))
        .bind(investment.id)
        .bind(payout)
        .bind(&investment.cadence)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE wallets
            SET balance = balance + $2, total_profit = total_profit + $2, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(investment.user_id)
        .bind(payout)
        .execute(&mut *tx)
        .await?;

        let new_earned = investment.earned_profit + payout;
        let completed = new_earned >= investment.expected_profit;
        let next = investment.next_profit_date + investment.cadence_enum().interval();

        sqlx::query(
            r#"
            UPDATE investments
            SET earned_profit = $2, next_profit_date = $3, status = $4
            WHERE id = $1
            "#,
        )
        .bind(investment.id)
        .bind(new_earned)
        .bind(next)
        .bind(if completed { "completed" } else { "active" })
        .execute(&mut *tx)
        .await?;

        let distribution = sqlx::query_as::<_, ProfitDistribution>(&format!(
            r#"
            UPDATE profit_distributions
            SET status = 'completed', distributed_at = $2
            WHERE id = $1
            RETURNING {DISTRIBUTION_COLUMNS}
            "#,
        ))
        .bind(distribution.id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DistributionOutcome::Distributed {
            user_id: investment.user_id,
            amount: payout,
            investment_completed: completed,
            distribution,
        })
    }

    /// Record a failed attempt with no balance effect. The investment's
    /// `next_profit_date` is untouched, so the next tick retries it.
    pub async fn record_failed(
        &self,
        investment_id: Uuid,
        cadence: &str,
        amount: Decimal,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO profit_distributions (investment_id, amount, cadence, status)
            VALUES ($1, $2, $3, 'failed')
            "#,
        )
        .bind(investment_id)
        .bind(amount)
        .bind(cadence)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Distributions for one investment, newest first
    pub async fn list_for_investment(
        &self,
        investment_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProfitDistribution>, RepositoryError> {
        let distributions = sqlx::query_as::<_, ProfitDistribution>(&format!(
            r#"
            SELECT {DISTRIBUTION_COLUMNS}
            FROM profit_distributions
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

        Ok(distributions)
    }

    /// Distributions across all of a user's investments, newest first
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ProfitDistribution>, RepositoryError> {
        let distributions = sqlx::query_as::<_, ProfitDistribution>(
            r#"
            SELECT d.id, d.investment_id, d.amount, d.cadence, d.status,
                   d.distributed_at, d.created_at
            FROM profit_distributions d
            JOIN investments i ON i.id = d.investment_id
            WHERE i.user_id = $1
            ORDER BY d.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(distributions)
    }
}
