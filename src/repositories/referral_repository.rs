//! Repository for referral edges and commission credits.
//!
//! A cascade run is one database transaction: the idempotency marker
//! (`commission_events`) goes in first with `ON CONFLICT DO NOTHING`, and
//! every per-level credit commits with it or not at all.

use crate::error::RepositoryError;
use crate::models::{LevelEarnings, Referral, ReferralStatus};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

const REFERRAL_COLUMNS: &str =
    "id, referrer_id, referred_user_id, level, commission_rate, total_earnings, status, created_at";

/// One ancestor credit planned by the chain walk
#[derive(Debug, Clone)]
pub struct PlannedCredit {
    pub referrer_id: Uuid,
    pub level: i32,
    pub rate: Decimal,
    pub commission: Decimal,
}

pub struct ReferralRepository {
    pool: PgPool,
}

impl ReferralRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_edge(
        &self,
        referrer_id: Uuid,
        referred_user_id: Uuid,
    ) -> Result<Option<Referral>, RepositoryError> {
        let referral = sqlx::query_as::<_, Referral>(&format!(
            r#"
            SELECT {REFERRAL_COLUMNS}
            FROM referrals
            WHERE referrer_id = $1 AND referred_user_id = $2
            "#,
        ))
        .bind(referrer_id)
        .bind(referred_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(referral)
    }

    /// First completed deposit qualifies the referred user: their pending
    /// level-1 edge becomes active
    pub async fn activate_direct_edge(
        &self,
        referred_user_id: Uuid,
    ) -> Result<Option<Referral>, RepositoryError> {
        let referral = sqlx::query_as::<_, Referral>(&format!(
            r#"
            UPDATE referrals
            SET status = 'active'
            WHERE referred_user_id = $1 AND level = 1 AND status = 'pending'
            RETURNING {REFERRAL_COLUMNS}
            "#,
        ))
        .bind(referred_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(referral)
    }

    /// Admin toggle for an edge (active/inactive)
    pub async fn set_status(
        &self,
        id: Uuid,
        status: ReferralStatus,
    ) -> Result<Referral, RepositoryError> {
        let referral = sqlx::query_as::<_, Referral>(&format!(
            r#"
            UPDATE referrals
            SET status = $2
            WHERE id = $1
            RETURNING {REFERRAL_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;

        referral.ok_or_else(|| RepositoryError::NotFound(format!("Referral {} not found", id)))
    }

    /// Atomically apply one cascade run. Returns `false` without touching
    /// any balance when `source_id` was already consumed.
    pub async fn apply_cascade(
        &self,
        source_id: Uuid,
        event_kind: &str,
        origin_user_id: Uuid,
        amount: Decimal,
        credits: &[PlannedCredit],
    ) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Idempotency marker first; a duplicate invocation stops here
        let marker = sqlx::query(
            r#"
            INSERT INTO commission_events (source_id, event_kind, origin_user_id, amount)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (source_id) DO NOTHING
            "#,
        )
        .bind(source_id)
        .bind(event_kind)
        .bind(origin_user_id)
        .bind(amount)
        .execute(&mut *tx)
        .await?;

        if marker.rows_affected() == 0 {
            return Ok(false);
        }

        for credit in credits {
            // Deeper edges are materialized on first credit; existing edges
            // accumulate earnings
            let referral_id = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO referrals
                (referrer_id, referred_user_id, level, commission_rate, total_earnings, status)
                VALUES ($1, $2, $3, $4, $5, 'active')
                ON CONFLICT (referrer_id, referred_user_id)
                DO UPDATE SET total_earnings = referrals.total_earnings + $5
                RETURNING id
                "#,
            )
            .bind(credit.referrer_id)
            .bind(origin_user_id)
            .bind(credit.level)
            .bind(credit.rate)
            .bind(credit.commission)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE wallets
                SET balance = balance + $2, updated_at = NOW()
                WHERE user_id = $1
                "#,
            )
            .bind(credit.referrer_id)
            .bind(credit.commission)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO commission_credits (source_id, referral_id, referrer_id, level, amount)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(source_id)
            .bind(referral_id)
            .bind(credit.referrer_id)
            .bind(credit.level)
            .bind(credit.commission)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(true)
    }

    /// Per-level commission rollup for one referrer
    pub async fn breakdown_by_level(
        &self,
        referrer_id: Uuid,
    ) -> Result<Vec<LevelEarnings>, RepositoryError> {
        let breakdown = sqlx::query_as::<_, LevelEarnings>(
            r#"
            SELECT level, COUNT(*) AS referral_count,
                   COALESCE(SUM(total_earnings), 0) AS total_earnings
            FROM referrals
            WHERE referrer_id = $1
            GROUP BY level
            ORDER BY level
            "#,
        )
        .bind(referrer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(breakdown)
    }

    /// Edges where this user is the referrer, level then recency
    pub async fn list_for_referrer(
        &self,
        referrer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Referral>, RepositoryError> {
        let referrals = sqlx::query_as::<_, Referral>(&format!(
            r#"
            SELECT {REFERRAL_COLUMNS}
            FROM referrals
            WHERE referrer_id = $1
            ORDER BY level, created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(referrer_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(referrals)
    }
}
