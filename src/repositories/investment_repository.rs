//! Repository for investments and their lifecycle transitions

use crate::error::RepositoryError;
use crate::models::{Investment, InvestmentStatus, Plan};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

const INVESTMENT_COLUMNS: &str =
    "id, user_id, plan_id, amount, rate, cadence, expected_profit, earned_profit, \
     status, is_paused, next_profit_date, start_date, end_date, created_at";

pub struct InvestmentRepository {
    pool: PgPool,
}

impl InvestmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Accept a plan subscription: debit the wallet and create the active
    /// investment in one database transaction.
    pub async fn purchase(
        &self,
        user_id: Uuid,
        plan: &Plan,
        amount: Decimal,
        now: NaiveDateTime,
    ) -> Result<Investment, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let balance = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT balance
            FROM wallets
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("Wallet not found".to_string()))?;

        if balance < amount {
            return Err(RepositoryError::InsufficientFunds(format!(
                "available {}, required {}",
                balance, amount
            )));
        }

        sqlx::query(
            r#"
            UPDATE wallets
            SET balance = balance - $2, total_invested = total_invested + $2, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .execute(&mut *tx)
        .await?;

        let interval = plan.cadence_enum().interval();
        let investment = sqlx::query_as::<_, Investment>(&format!(
            r#"
            INSERT INTO investments
            (user_id, plan_id, amount, rate, cadence, expected_profit,
             next_profit_date, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {INVESTMENT_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(plan.id)
        .bind(amount)
        .bind(plan.rate)
        .bind(&plan.cadence)
        .bind(plan.expected_profit_for(amount))
        .bind(now + interval)
        .bind(now)
        .bind(now + plan.term())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(investment)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Investment>, RepositoryError> {
        let investment = sqlx::query_as::<_, Investment>(&format!(
            r#"
            SELECT {INVESTMENT_COLUMNS}
            FROM investments
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(investment)
    }

    /// Ids of investments due for a payout at `now`. The distribution step
    /// re-checks this predicate under a row lock, so a stale id here is
    /// harmless.
    pub async fn find_due_ids(&self, now: NaiveDateTime) -> Result<Vec<Uuid>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM investments
            WHERE status = 'active' AND is_paused = FALSE AND next_profit_date <= $1
            ORDER BY next_profit_date
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Freeze payouts. `next_profit_date` stays put while paused.
    pub async fn pause(&self, id: Uuid) -> Result<Investment, RepositoryError> {
        let updated = sqlx::query_as::<_, Investment>(&format!(
            r#"
            UPDATE investments
            SET is_paused = TRUE, status = 'paused'
            WHERE id = $1 AND status = 'active'
            RETURNING {INVESTMENT_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(investment) => Ok(investment),
            None => Err(self.transition_failure(id, "pause").await?),
        }
    }

    /// Unfreeze payouts. The caller supplies a fresh `next_profit_date`
    /// computed from now, so missed cycles are not paid retroactively.
    pub async fn resume(
        &self,
        id: Uuid,
        next_profit_date: NaiveDateTime,
    ) -> Result<Investment, RepositoryError> {
        let updated = sqlx::query_as::<_, Investment>(&format!(
            r#"
            UPDATE investments
            SET is_paused = FALSE, status = 'active', next_profit_date = $2
            WHERE id = $1 AND status = 'paused'
            RETURNING {INVESTMENT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(next_profit_date)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(investment) => Ok(investment),
            None => Err(self.transition_failure(id, "resume").await?),
        }
    }

    /// Investments for a user, newest first, optionally filtered by status
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<InvestmentStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Investment>, RepositoryError> {
        let investments = match status {
            Some(status) => {
                sqlx::query_as::<_, Investment>(&format!(
                    r#"
                    SELECT {INVESTMENT_COLUMNS}
                    FROM investments
                    WHERE user_id = $1 AND status = $2
                    ORDER BY created_at DESC
                    LIMIT $3 OFFSET $4
                    "#,
                ))
                .bind(user_id)
                .bind(status.as_str())
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Investment>(&format!(
                    r#"
                    SELECT {INVESTMENT_COLUMNS}
                    FROM investments
                    WHERE user_id = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                ))
                .bind(user_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(investments)
    }

    async fn transition_failure(
        &self,
        id: Uuid,
        action: &str,
    ) -> Result<RepositoryError, RepositoryError> {
        match self.find_by_id(id).await? {
            Some(existing) => Ok(RepositoryError::Conflict(format!(
                "cannot {} investment {} in status '{}'",
                action, id, existing.status
            ))),
            None => Ok(RepositoryError::NotFound(format!(
                "Investment {} not found",
                id
            ))),
        }
    }
}
