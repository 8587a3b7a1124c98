//! Deposit/withdrawal workflow: request creation, fee computation and the
//! approval state machine.

use crate::config::DepositCommissionPolicy;
use crate::error::{AppError, AppResult};
use crate::models::{CommissionEventKind, Transaction, TransactionStatus, User};
use crate::repositories::{
    GatewayRepository, ReferralRepository, TransactionRepository, UserRepository,
};
use crate::services::commission_cascade::CommissionCascade;
use crate::services::notifier::EventNotifier;
use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

pub struct TransactionWorkflow {
    tx_repo: Arc<TransactionRepository>,
    gateway_repo: Arc<GatewayRepository>,
    user_repo: Arc<UserRepository>,
    referral_repo: Arc<ReferralRepository>,
    cascade: Arc<CommissionCascade>,
    notifier: Arc<EventNotifier>,
    deposit_policy: DepositCommissionPolicy,
    /// Auto-cancel pending deposits older than this, if configured
    pending_deposit_timeout_hours: Option<i64>,
}

impl TransactionWorkflow {
    pub fn new(
        tx_repo: Arc<TransactionRepository>,
        gateway_repo: Arc<GatewayRepository>,
        user_repo: Arc<UserRepository>,
        referral_repo: Arc<ReferralRepository>,
        cascade: Arc<CommissionCascade>,
        notifier: Arc<EventNotifier>,
        deposit_policy: DepositCommissionPolicy,
        pending_deposit_timeout_hours: Option<i64>,
    ) -> Self {
        Self {
            tx_repo,
            gateway_repo,
            user_repo,
            referral_repo,
            cascade,
            notifier,
            deposit_policy,
            pending_deposit_timeout_hours,
        }
    }

    /// Create a pending deposit request
    pub async fn create_deposit(
        &self,
        user_id: Uuid,
        amount: Decimal,
        gateway_id: Uuid,
        proof_ref: Option<&str>,
    ) -> AppResult<Transaction> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation("Amount must be positive".into()));
        }

        self.require_user(user_id).await?;

        let gateway = self
            .gateway_repo
            .find_by_id(gateway_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Gateway {} not found", gateway_id)))?;

        if !gateway.deposit_enabled {
            return Err(AppError::Validation(format!(
                "Gateway {} is disabled for deposits",
                gateway.name
            )));
        }
        if !gateway.deposit_in_range(amount) {
            return Err(AppError::Validation(format!(
                "Deposit amount must be between {} and {}",
                gateway.min_deposit, gateway.max_deposit
            )));
        }

        let fee = gateway.deposit_fee_for(amount);
        let net_amount = amount - fee;
        if net_amount <= Decimal::ZERO {
            return Err(AppError::Validation(format!(
                "Amount {} does not cover the gateway fee {}",
                amount, fee
            )));
        }

        let transaction = self
            .tx_repo
            .create_deposit(user_id, gateway_id, amount, fee, net_amount, proof_ref)
            .await?;

        info!(
            "Deposit request {} created: user={}, amount={}, fee={}",
            transaction.id, user_id, amount, fee
        );

        Ok(transaction)
    }

    /// Create a pending withdrawal request; `amount + fee` is reserved out
    /// of the wallet immediately
    pub async fn create_withdrawal(
        &self,
        user_id: Uuid,
        amount: Decimal,
        gateway_id: Uuid,
        payout_details: &str,
    ) -> AppResult<Transaction> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation("Amount must be positive".into()));
        }
        if payout_details.trim().is_empty() {
            return Err(AppError::Validation("Payout details are required".into()));
        }

        self.require_user(user_id).await?;

        let gateway = self
            .gateway_repo
            .find_by_id(gateway_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Gateway {} not found", gateway_id)))?;

        if !gateway.withdraw_enabled {
            return Err(AppError::Validation(format!(
                "Gateway {} is disabled for withdrawals",
                gateway.name
            )));
        }
        if !gateway.withdraw_in_range(amount) {
            return Err(AppError::Validation(format!(
                "Withdrawal amount must be between {} and {}",
                gateway.min_withdraw, gateway.max_withdraw
            )));
        }

        let fee = gateway.withdraw_fee_for(amount);

        let transaction = self
            .tx_repo
            .create_withdrawal(user_id, gateway_id, amount, fee, payout_details)
            .await?;

        info!(
            "Withdrawal request {} created: user={}, amount={}, fee={}",
            transaction.id, user_id, amount, fee
        );

        Ok(transaction)
    }

    /// Move a pending transaction under review
    pub async fn start_review(&self, id: Uuid, admin_id: Uuid) -> AppResult<Transaction> {
        self.require_admin(admin_id).await?;
        Ok(self.tx_repo.start_review(id, admin_id).await?)
    }

    /// Approve a pending/processing transaction. Deposit approvals feed
    /// the commission cascade per the configured policy.
    pub async fn approve(
        &self,
        id: Uuid,
        admin_id: Uuid,
        admin_note: Option<&str>,
    ) -> AppResult<Transaction> {
        self.require_admin(admin_id).await?;

        let transaction = self.tx_repo.approve(id, admin_id, admin_note).await?;

        info!(
            "Transaction {} approved by {}: {} {}",
            transaction.id, admin_id, transaction.tx_type, transaction.amount
        );

        if !transaction.is_withdrawal() {
            self.after_deposit_completed(&transaction).await;
        }

        self.notifier.transaction_finalized(&transaction).await;

        Ok(transaction)
    }

    /// Reject a pending/processing transaction with a mandatory reason
    pub async fn reject(&self, id: Uuid, admin_id: Uuid, reason: &str) -> AppResult<Transaction> {
        if reason.trim().is_empty() {
            return Err(AppError::Validation("Rejection reason is required".into()));
        }

        self.require_admin(admin_id).await?;

        let transaction = self.tx_repo.reject(id, admin_id, reason).await?;

        info!(
            "Transaction {} rejected by {}: {}",
            transaction.id, admin_id, reason
        );

        self.notifier.transaction_finalized(&transaction).await;

        Ok(transaction)
    }

    /// User-initiated cancel of their own pending transaction
    pub async fn cancel(&self, id: Uuid, user_id: Uuid) -> AppResult<Transaction> {
        let transaction = self.tx_repo.cancel(id, user_id).await?;

        info!("Transaction {} cancelled by owner", transaction.id);

        self.notifier.transaction_finalized(&transaction).await;

        Ok(transaction)
    }

    /// Auto-cancel pending deposits that outlived the configured timeout.
    /// A no-op when the timeout policy is not configured.
    pub async fn expire_stale_deposits(&self, now: NaiveDateTime) -> AppResult<u64> {
        let hours = match self.pending_deposit_timeout_hours {
            Some(hours) => hours,
            None => return Ok(0),
        };

        let cutoff = now - Duration::hours(hours);
        let expired = self.tx_repo.expire_pending_deposits(cutoff).await?;

        if expired > 0 {
            info!("Auto-cancelled {} stale pending deposit(s)", expired);
        }

        Ok(expired)
    }

    /// Transaction history read model
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        status: Option<TransactionStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Transaction>> {
        Ok(self
            .tx_repo
            .list_for_user(user_id, status, limit, offset)
            .await?)
    }

    /// First-deposit qualification and the deposit-driven cascade. Cascade
    /// failures are logged, never surfaced; the event id makes a later
    /// re-invocation safe.
    async fn after_deposit_completed(&self, transaction: &Transaction) {
        let is_first = match self
            .tx_repo
            .count_completed_deposits(transaction.user_id)
            .await
        {
            Ok(count) => count == 1,
            Err(e) => {
                error!(
                    "Deposit count lookup failed for user {}: {}",
                    transaction.user_id, e
                );
                return;
            }
        };

        if is_first {
            match self
                .referral_repo
                .activate_direct_edge(transaction.user_id)
                .await
            {
                Ok(Some(edge)) => {
                    info!(
                        "Referral edge {} activated by first deposit of user {}",
                        edge.id, transaction.user_id
                    );
                }
                Ok(None) => {}
                Err(e) => {
                    error!(
                        "Referral activation failed for user {}: {}",
                        transaction.user_id, e
                    );
                }
            }
        }

        let pays_commission = match self.deposit_policy {
            DepositCommissionPolicy::FirstOnly => is_first,
            DepositCommissionPolicy::Every => true,
        };

        if pays_commission {
            if let Err(e) = self
                .cascade
                .distribute(
                    transaction.id,
                    CommissionEventKind::Deposit,
                    transaction.user_id,
                    transaction.amount,
                )
                .await
            {
                error!(
                    "Deposit cascade failed for transaction {}: {}",
                    transaction.id, e
                );
            }
        }
    }

    async fn require_user(&self, user_id: Uuid) -> AppResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    async fn require_admin(&self, user_id: Uuid) -> AppResult<User> {
        let user = self.require_user(user_id).await?;
        if !user.is_admin() {
            return Err(AppError::Unauthorized(
                "Admin role required for this operation".into(),
            ));
        }
        Ok(user)
    }
}
