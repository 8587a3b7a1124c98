//! Profit distribution scheduler.
//!
//! A tick selects every due investment and applies at most one payout to
//! each. Per-investment mutual exclusion and idempotency live in the
//! distribution repository's locked re-check; this service only batches,
//! retries and reports.

use crate::error::{AppError, AppResult};
use crate::models::CommissionEventKind;
use crate::repositories::{
    DistributionOutcome, DistributionRepository, InvestmentRepository, UserRepository,
};
use crate::services::commission_cascade::CommissionCascade;
use crate::services::notifier::EventNotifier;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{error, info};
use uuid::Uuid;

/// Operator-facing summary of one scheduler run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistributionRunSummary {
    pub distributed: usize,
    pub failed: usize,
    pub completed: usize,
}

pub struct ProfitScheduler {
    investment_repo: Arc<InvestmentRepository>,
    distribution_repo: Arc<DistributionRepository>,
    user_repo: Arc<UserRepository>,
    cascade: Arc<CommissionCascade>,
    notifier: Arc<EventNotifier>,
    tick_interval: Duration,
}

impl ProfitScheduler {
    pub fn new(
        investment_repo: Arc<InvestmentRepository>,
        distribution_repo: Arc<DistributionRepository>,
        user_repo: Arc<UserRepository>,
        cascade: Arc<CommissionCascade>,
        notifier: Arc<EventNotifier>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            investment_repo,
            distribution_repo,
            user_repo,
            cascade,
            notifier,
            tick_interval,
        }
    }

    /// Admin-triggered "run distribution now"
    pub async fn run_now_as(&self, admin_id: Uuid) -> AppResult<DistributionRunSummary> {
        let admin = self
            .user_repo
            .find_by_id(admin_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", admin_id)))?;
        if !admin.is_admin() {
            return Err(AppError::Unauthorized(
                "Admin role required for this operation".into(),
            ));
        }

        self.run_now().await
    }

    /// Process every due investment once. Failures are isolated per
    /// investment: the batch continues and the failed one retries next
    /// tick because its `next_profit_date` never advanced.
    pub async fn run_now(&self) -> AppResult<DistributionRunSummary> {
        let now = Utc::now().naive_utc();
        let due = self.investment_repo.find_due_ids(now).await?;

        let mut summary = DistributionRunSummary::default();

        for investment_id in due {
            match self.distribution_repo.apply_next(investment_id, now).await {
                Ok(DistributionOutcome::Distributed {
                    distribution,
                    user_id,
                    amount,
                    investment_completed,
                }) => {
                    summary.distributed += 1;
                    if investment_completed {
                        summary.completed += 1;
                    }

                    // Downstream of the distribution's own atomic unit;
                    // a failure here is retried via the same event id
                    if let Err(e) = self
                        .cascade
                        .distribute(
                            distribution.id,
                            CommissionEventKind::Profit,
                            user_id,
                            amount,
                        )
                        .await
                    {
                        error!(
                            "Profit cascade failed for distribution {}: {}",
                            distribution.id, e
                        );
                    }

                    self.notifier.distribution_completed(&distribution).await;
                }
                Ok(DistributionOutcome::Completed) => {
                    summary.completed += 1;
                }
                Ok(DistributionOutcome::Skipped) => {}
                Err(e) => {
                    summary.failed += 1;
                    error!(
                        "Distribution failed for investment {}: {}",
                        investment_id, e
                    );
                    self.record_failure(investment_id).await;
                }
            }
        }

        info!(
            "Distribution run: {} distributed, {} failed, {} completed",
            summary.distributed, summary.failed, summary.completed
        );

        Ok(summary)
    }

    /// Recurring tick loop for the worker binary
    pub async fn start(self: Arc<Self>) {
        let mut interval = time::interval(self.tick_interval);
        info!(
            "Profit scheduler started, ticking every {:?}",
            self.tick_interval
        );

        loop {
            interval.tick().await;

            if let Err(e) = self.run_now().await {
                error!("Scheduler tick failed: {}", e);
            }
        }
    }

    /// Best-effort failed-distribution marker; balances are untouched
    async fn record_failure(&self, investment_id: Uuid) {
        let investment = match self.investment_repo.find_by_id(investment_id).await {
            Ok(Some(i)) => i,
            Ok(None) => return,
            Err(e) => {
                error!(
                    "Could not load investment {} to record failure: {}",
                    investment_id, e
                );
                return;
            }
        };

        if let Err(e) = self
            .distribution_repo
            .record_failed(investment_id, &investment.cadence, investment.clamped_payout())
            .await
        {
            error!(
                "Could not record failed distribution for investment {}: {}",
                investment_id, e
            );
        }
    }
}
