//! Repository for the transaction approval ledger.
//!
//! Terminal transitions are conditional updates keyed on the current
//! status, so two admins racing to approve/reject the same transaction
//! cannot both win; the loser sees `Conflict`. Wallet movements commit in
//! the same database transaction as the status change.

use crate::error::RepositoryError;
use crate::models::{Transaction, TransactionStatus, TransactionType};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

const TX_COLUMNS: &str = "id, user_id, gateway_id, tx_type, amount, fee, net_amount, status, \
                          proof_ref, payout_details, admin_note, processed_by, processed_at, created_at";

pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a pending deposit request. No wallet movement happens until
    /// approval.
    pub async fn create_deposit(
        &self,
        user_id: Uuid,
        gateway_id: Uuid,
        amount: Decimal,
        fee: Decimal,
        net_amount: Decimal,
        proof_ref: Option<&str>,
    ) -> Result<Transaction, RepositoryError> {
        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            INSERT INTO transactions
            (user_id, gateway_id, tx_type, amount, fee, net_amount, status, proof_ref)
            VALUES ($1, $2, 'deposit', $3, $4, $5, 'pending', $6)
            RETURNING {TX_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(gateway_id)
        .bind(amount)
        .bind(fee)
        .bind(net_amount)
        .bind(proof_ref)
        .fetch_one(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Create a pending withdrawal and reserve `amount + fee` out of the
    /// wallet balance in the same database transaction, so two concurrent
    /// requests cannot double-spend the same funds.
    pub async fn create_withdrawal(
        &self,
        user_id: Uuid,
        gateway_id: Uuid,
        amount: Decimal,
        fee: Decimal,
        payout_details: &str,
    ) -> Result<Transaction, RepositoryError> {
        let liability = amount + fee;

        let mut tx = self.pool.begin().await?;

        // Lock the wallet row for the balance check and reservation
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

        if balance < liability {
            return Err(RepositoryError::InsufficientFunds(format!(
                "available {}, required {}",
                balance, liability
            )));
        }

        sqlx::query(
            r#"
            UPDATE wallets
            SET balance = balance - $2, reserved = reserved + $2, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(liability)
        .execute(&mut *tx)
        .await?;

        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            INSERT INTO transactions
            (user_id, gateway_id, tx_type, amount, fee, net_amount, status, payout_details)
            VALUES ($1, $2, 'withdraw', $3, $4, $5, 'pending', $6)
            RETURNING {TX_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(gateway_id)
        .bind(amount)
        .bind(fee)
        .bind(liability)
        .bind(payout_details)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(transaction)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>, RepositoryError> {
        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            SELECT {TX_COLUMNS}
            FROM transactions
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Move a pending transaction under review (pending -> processing)
    pub async fn start_review(
        &self,
        id: Uuid,
        admin_id: Uuid,
    ) -> Result<Transaction, RepositoryError> {
        let updated = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            UPDATE transactions
            SET status = 'processing', processed_by = $2
            WHERE id = $1 AND status = 'pending'
            RETURNING {TX_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(transaction) => Ok(transaction),
            None => Err(self.transition_failure(id, "start review").await?),
        }
    }

    /// Approve a pending/processing transaction.
    ///
    /// Deposits credit the wallet with the net amount; withdrawals clear
    /// the reservation (funds leave the system). Both the status change
    /// and the wallet movement commit atomically.
    pub async fn approve(
        &self,
        id: Uuid,
        admin_id: Uuid,
        admin_note: Option<&str>,
    ) -> Result<Transaction, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            UPDATE transactions
            SET status = 'completed', processed_by = $2, processed_at = NOW(), admin_note = $3
            WHERE id = $1 AND status IN ('pending', 'processing')
            RETURNING {TX_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(admin_id)
        .bind(admin_note)
        .fetch_optional(&mut *tx)
        .await?;

        let transaction = match updated {
            Some(t) => t,
            None => return Err(self.transition_failure(id, "approve").await?),
        };

        match transaction.tx_type_enum() {
            Some(TransactionType::Deposit) => {
                sqlx::query(
                    r#"
                    UPDATE wallets
                    SET balance = balance + $2, total_deposited = total_deposited + $3,
                        updated_at = NOW()
                    WHERE user_id = $1
                    "#,
                )
                .bind(transaction.user_id)
                .bind(transaction.net_amount)
                .bind(transaction.amount)
                .execute(&mut *tx)
                .await?;
            }
            Some(TransactionType::Withdraw) => {
                sqlx::query(
                    r#"
                    UPDATE wallets
                    SET reserved = reserved - $2, total_withdrawn = total_withdrawn + $3,
                        updated_at = NOW()
                    WHERE user_id = $1
                    "#,
                )
                .bind(transaction.user_id)
                .bind(transaction.net_amount)
                .bind(transaction.amount)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                return Err(RepositoryError::InvalidInput(format!(
                    "Unknown transaction type: {}",
                    transaction.tx_type
                )))
            }
        }

        tx.commit().await?;

        Ok(transaction)
    }

    /// Reject a pending/processing transaction; a withdrawal's reservation
    /// is released back into the balance
    pub async fn reject(
        &self,
        id: Uuid,
        admin_id: Uuid,
        reason: &str,
    ) -> Result<Transaction, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            UPDATE transactions
            SET status = 'rejected', processed_by = $2, processed_at = NOW(), admin_note = $3
            WHERE id = $1 AND status IN ('pending', 'processing')
            RETURNING {TX_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(admin_id)
        .bind(reason)
        .fetch_optional(&mut *tx)
        .await?;

        let transaction = match updated {
            Some(t) => t,
            None => return Err(self.transition_failure(id, "reject").await?),
        };

        if transaction.is_withdrawal() {
            self.release_reservation(&mut tx, &transaction).await?;
        }

        tx.commit().await?;

        Ok(transaction)
    }

    /// User-initiated cancel, only from `pending` and only by the owner
    pub async fn cancel(&self, id: Uuid, user_id: Uuid) -> Result<Transaction, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            UPDATE transactions
            SET status = 'cancelled', processed_at = NOW()
            WHERE id = $1 AND user_id = $2 AND status = 'pending'
            RETURNING {TX_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let transaction = match updated {
            Some(t) => t,
            None => return Err(self.transition_failure(id, "cancel").await?),
        };

        if transaction.is_withdrawal() {
            self.release_reservation(&mut tx, &transaction).await?;
        }

        tx.commit().await?;

        Ok(transaction)
    }

    /// Auto-cancel pending deposits created before `cutoff`. Returns the
    /// number of transactions cancelled.
    pub async fn expire_pending_deposits(
        &self,
        cutoff: NaiveDateTime,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET status = 'cancelled', processed_at = NOW(),
                admin_note = 'auto-cancelled: pending past timeout'
            WHERE tx_type = 'deposit' AND status = 'pending' AND created_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Completed deposit count for first-deposit qualification
    pub async fn count_completed_deposits(&self, user_id: Uuid) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM transactions
            WHERE user_id = $1 AND tx_type = 'deposit' AND status = 'completed'
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Transaction history for a user, newest first, optionally filtered
    /// by status
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<TransactionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transaction>, RepositoryError> {
        let transactions = match status {
            Some(status) => {
                sqlx::query_as::<_, Transaction>(&format!(
                    r#"
                    SELECT {TX_COLUMNS}
                    FROM transactions
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
                sqlx::query_as::<_, Transaction>(&format!(
                    r#"
                    SELECT {TX_COLUMNS}
                    FROM transactions
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

        Ok(transactions)
    }

    /// Put `amount + fee` back into the balance after a withdrawal reaches
    /// rejected/cancelled
    async fn release_reservation(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        transaction: &Transaction,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE wallets
            SET balance = balance + $2, reserved = reserved - $2, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(transaction.user_id)
        .bind(transaction.net_amount)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Distinguish a missing row from a lost transition race
    async fn transition_failure(
        &self,
        id: Uuid,
        action: &str,
    ) -> Result<RepositoryError, RepositoryError> {
        match self.find_by_id(id).await? {
            Some(existing) => Ok(RepositoryError::Conflict(format!(
                "cannot {} transaction {} in status '{}'",
                action, id, existing.status
            ))),
            None => Ok(RepositoryError::NotFound(format!(
                "Transaction {} not found",
                id
            ))),
        }
    }
}
