use crate::error::RepositoryError;
use crate::models::Plan;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for the investment plan catalog
pub struct PlanRepository {
    pool: PgPool,
}

impl PlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        name: &str,
        rate: Decimal,
        cadence: &str,
        term_periods: i32,
        min_amount: Decimal,
        max_amount: Decimal,
    ) -> Result<Plan, RepositoryError> {
        let plan = sqlx::query_as::<_, Plan>(
            r#"
            INSERT INTO plans (name, rate, cadence, term_periods, min_amount, max_amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, rate, cadence, term_periods, min_amount, max_amount, created_at
            "#,
        )
        .bind(name)
        .bind(rate)
        .bind(cadence)
        .bind(term_periods)
        .bind(min_amount)
        .bind(max_amount)
        .fetch_one(&self.pool)
        .await?;

        Ok(plan)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Plan>, RepositoryError> {
        let plan = sqlx::query_as::<_, Plan>(
            r#"
            SELECT id, name, rate, cadence, term_periods, min_amount, max_amount, created_at
            FROM plans
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }

    pub async fn list(&self) -> Result<Vec<Plan>, RepositoryError> {
        let plans = sqlx::query_as::<_, Plan>(
            r#"
            SELECT id, name, rate, cadence, term_periods, min_amount, max_amount, created_at
            FROM plans
            ORDER BY min_amount
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }
}
