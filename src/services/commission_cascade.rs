//! Seven-level referral commission cascade.
//!
//! Walks the referral chain upward from the originating user and credits
//! each qualifying ancestor per that level's configured rate. One cascade
//! run per triggering event id; reruns are no-ops.

use crate::error::AppResult;
use crate::models::{commission_for, CommissionEventKind, ReferralStatus};
use crate::repositories::{PlannedCredit, ReferralRepository, UserRepository};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

pub struct CommissionCascade {
    user_repo: Arc<UserRepository>,
    referral_repo: Arc<ReferralRepository>,
    /// Percent rate per level, level 1 first; length bounds the walk (≤ 7)
    rates: Vec<Decimal>,
}

impl CommissionCascade {
    pub fn new(
        user_repo: Arc<UserRepository>,
        referral_repo: Arc<ReferralRepository>,
        rates: Vec<Decimal>,
    ) -> Self {
        Self {
            user_repo,
            referral_repo,
            rates,
        }
    }

    /// Credit the upline for one triggering event. Returns the number of
    /// ancestors credited; 0 when the event was already consumed or no
    /// ancestor qualifies.
    pub async fn distribute(
        &self,
        source_id: Uuid,
        kind: CommissionEventKind,
        origin_user_id: Uuid,
        amount: Decimal,
    ) -> AppResult<usize> {
        let credits = self.plan_credits(origin_user_id, amount).await?;

        // The event marker is written even when nothing qualifies, so a
        // retry of the triggering event does not re-walk the chain
        let applied = self
            .referral_repo
            .apply_cascade(source_id, kind.as_str(), origin_user_id, amount, &credits)
            .await?;

        if !applied {
            debug!(
                "Cascade for {} event {} already applied, skipping",
                kind.as_str(),
                source_id
            );
            return Ok(0);
        }

        if !credits.is_empty() {
            info!(
                "Cascade for {} event {}: credited {} ancestor(s) of user {}",
                kind.as_str(),
                source_id,
                credits.len(),
                origin_user_id
            );
        }

        Ok(credits.len())
    }

    /// Iterative upward walk, bounded by the rate schedule length. An
    /// inactive edge is skipped without breaking the walk; a missing
    /// referrer pointer ends it.
    async fn plan_credits(
        &self,
        origin_user_id: Uuid,
        amount: Decimal,
    ) -> AppResult<Vec<PlannedCredit>> {
        let mut credits = Vec::new();
        let mut current = origin_user_id;

        for (index, &rate) in self.rates.iter().enumerate() {
            let level = (index + 1) as i32;

            let referrer_id = match self.user_repo.referrer_of(current).await? {
                Some(id) => id,
                None => break,
            };

            let commission = commission_for(amount, rate);
            if commission > Decimal::ZERO && self.edge_qualifies(referrer_id, origin_user_id, level).await? {
                credits.push(PlannedCredit {
                    referrer_id,
                    level,
                    rate,
                    commission,
                });
            }

            current = referrer_id;
        }

        Ok(credits)
    }

    /// A known edge must be active. Level-1 edges are registered at signup,
    /// so a missing one means the referral never qualified; deeper edges
    /// are derived from the chain and materialize on first credit.
    async fn edge_qualifies(
        &self,
        referrer_id: Uuid,
        origin_user_id: Uuid,
        level: i32,
    ) -> AppResult<bool> {
        match self
            .referral_repo
            .find_edge(referrer_id, origin_user_id)
            .await?
        {
            Some(edge) => Ok(edge.status_enum() == ReferralStatus::Active),
            None => Ok(level > 1),
        }
    }
}
