use crate::error::{AppError, AppResult};
use crate::models::{Adjustment, AdjustmentType, User};
use crate::repositories::{AdjustmentRepository, UserRepository};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service for the manual adjustment ledger
pub struct AdjustmentService {
    adjustment_repo: Arc<AdjustmentRepository>,
    user_repo: Arc<UserRepository>,
}

impl AdjustmentService {
    pub fn new(adjustment_repo: Arc<AdjustmentRepository>, user_repo: Arc<UserRepository>) -> Self {
        Self {
            adjustment_repo,
            user_repo,
        }
    }

    /// Admin-only: write an audited add/deduct against an investment's
    /// earned profit. The reason is mandatory; corrections are new
    /// compensating entries, never edits.
    pub async fn create(
        &self,
        investment_id: Uuid,
        amount: Decimal,
        kind: AdjustmentType,
        reason: &str,
        admin_id: Uuid,
    ) -> AppResult<Adjustment> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation("Amount must be positive".into()));
        }
        if reason.trim().is_empty() {
            return Err(AppError::Validation(
                "Adjustment reason is required".into(),
            ));
        }

        self.require_admin(admin_id).await?;

        let adjustment = self
            .adjustment_repo
            .create(investment_id, amount, kind, reason, admin_id)
            .await?;

        info!(
            "Adjustment {} on investment {}: {} {} by {}",
            adjustment.id, investment_id, adjustment.adjustment_type, adjustment.amount, admin_id
        );

        Ok(adjustment)
    }

    /// Adjustment history read model
    pub async fn list(
        &self,
        investment_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Adjustment>> {
        Ok(self
            .adjustment_repo
            .list_for_investment(investment_id, limit, offset)
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
