//! Repository for wallet reads.
//!
//! Wallet writes live in the repository that owns the originating ledger
//! row (transaction, distribution, adjustment, commission credit), so the
//! balance change and the ledger entry commit together or not at all.

use crate::error::RepositoryError;
use crate::models::Wallet;
use sqlx::PgPool;
use uuid::Uuid;

pub struct WalletRepository {
    pool: PgPool,
}

impl WalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's wallet
    pub async fn get(&self, user_id: Uuid) -> Result<Option<Wallet>, RepositoryError> {
        let wallet = sqlx::query_as::<_, Wallet>(
            r#"
            SELECT user_id, balance, reserved, total_deposited, total_withdrawn,
                   total_invested, total_profit, updated_at
            FROM wallets
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(wallet)
    }
}
