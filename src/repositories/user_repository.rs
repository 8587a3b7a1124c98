use crate::error::RepositoryError;
use crate::models::{User, UserRole};
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for user data access
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a user together with their wallet. If a referrer is given,
    /// the pending level-1 referral edge is written in the same database
    /// transaction; it activates on the user's first completed deposit.
    pub async fn register(
        &self,
        username: &str,
        role: UserRole,
        referred_by: Option<Uuid>,
        level_one_rate: rust_decimal::Decimal,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, role, referred_by)
            VALUES ($1, $2, $3)
            RETURNING id, username, role, referred_by, created_at
            "#,
        )
        .bind(username)
        .bind(role.as_str())
        .bind(referred_by)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO wallets (user_id)
            VALUES ($1)
            "#,
        )
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

        if let Some(referrer_id) = referred_by {
            sqlx::query(
                r#"
                INSERT INTO referrals (referrer_id, referred_user_id, level, commission_rate, status)
                VALUES ($1, $2, 1, $3, 'pending')
                ON CONFLICT (referrer_id, referred_user_id) DO NOTHING
                "#,
            )
            .bind(referrer_id)
            .bind(user.id)
            .bind(level_one_rate)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(user)
    }

    /// Find a user by UUID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, role, referred_by, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, role, referred_by, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Adjacency lookup for the referral chain walk: who referred this user
    pub async fn referrer_of(&self, user_id: Uuid) -> Result<Option<Uuid>, RepositoryError> {
        let referrer = sqlx::query_scalar::<_, Option<Uuid>>(
            r#"
            SELECT referred_by
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(referrer.flatten())
    }
}
