use crate::error::{AppError, AppResult};
use crate::models::{Investment, InvestmentStatus, User, Wallet};
use crate::repositories::{InvestmentRepository, PlanRepository, UserRepository, WalletRepository};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service for plan subscriptions and investment lifecycle controls
pub struct InvestmentService {
    investment_repo: Arc<InvestmentRepository>,
    plan_repo: Arc<PlanRepository>,
    user_repo: Arc<UserRepository>,
    wallet_repo: Arc<WalletRepository>,
}

impl InvestmentService {
    pub fn new(
        investment_repo: Arc<InvestmentRepository>,
        plan_repo: Arc<PlanRepository>,
        user_repo: Arc<UserRepository>,
        wallet_repo: Arc<WalletRepository>,
    ) -> Self {
        Self {
            investment_repo,
            plan_repo,
            user_repo,
            wallet_repo,
        }
    }

    /// Subscribe a user to a plan. Debits the wallet and schedules the
    /// first payout one cadence interval out.
    pub async fn purchase(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        amount: Decimal,
    ) -> AppResult<Investment> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation("Amount must be positive".into()));
        }

        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        let plan = self
            .plan_repo
            .find_by_id(plan_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Plan {} not found", plan_id)))?;

        if !plan.amount_in_range(amount) {
            return Err(AppError::Validation(format!(
                "Investment amount must be between {} and {}",
                plan.min_amount, plan.max_amount
            )));
        }

        let now = Utc::now().naive_utc();
        let investment = self
            .investment_repo
            .purchase(user_id, &plan, amount, now)
            .await?;

        info!(
            "Investment {} created: user={}, plan={}, amount={}, expected_profit={}",
            investment.id, user_id, plan.name, amount, investment.expected_profit
        );

        Ok(investment)
    }

    /// Admin-only: freeze payouts. `next_profit_date` does not advance
    /// while paused.
    pub async fn pause(&self, id: Uuid, admin_id: Uuid) -> AppResult<Investment> {
        self.require_admin(admin_id).await?;

        let investment = self.investment_repo.pause(id).await?;
        info!("Investment {} paused by {}", id, admin_id);

        Ok(investment)
    }

    /// Admin-only: unfreeze payouts. The next payout is one full cadence
    /// interval from now; missed cycles are not paid retroactively.
    pub async fn resume(&self, id: Uuid, admin_id: Uuid) -> AppResult<Investment> {
        self.require_admin(admin_id).await?;

        let current = self
            .investment_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Investment {} not found", id)))?;

        let next = Utc::now().naive_utc() + current.cadence_enum().interval();
        let investment = self.investment_repo.resume(id, next).await?;
        info!("Investment {} resumed by {}", id, admin_id);

        Ok(investment)
    }

    /// Wallet read model
    pub async fn wallet(&self, user_id: Uuid) -> AppResult<Wallet> {
        self.wallet_repo
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Wallet for user {} not found", user_id)))
    }

    /// Investment list read model
    pub async fn list_investments(
        &self,
        user_id: Uuid,
        status: Option<InvestmentStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Investment>> {
        Ok(self
            .investment_repo
            .list_for_user(user_id, status, limit, offset)
            .await?)
    }

    async fn require_admin(&self, user_id: Uuid) -> AppResult<User> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        if !user.is_admin() {
            return Err(AppError::Unauthorized(
                "Admin role required for this operation".into(),
            ));
        }
        Ok(user)
    }
}
