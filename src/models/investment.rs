//! Investment model: one row per accepted plan subscription

use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Payout cadence of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly,
}

impl Cadence {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Cadence::Daily),
            "weekly" => Ok(Cadence::Weekly),
            "monthly" => Ok(Cadence::Monthly),
            _ => Err(format!("Invalid cadence: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cadence::Daily => "daily",
            Cadence::Weekly => "weekly",
            Cadence::Monthly => "monthly",
        }
    }

    /// Gap between consecutive payouts
    pub fn interval(&self) -> Duration {
        match self {
            Cadence::Daily => Duration::days(1),
            Cadence::Weekly => Duration::days(7),
            Cadence::Monthly => Duration::days(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentStatus {
    Active,
    Paused,
    Completed,
}

impl InvestmentStatus {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "active" => Ok(InvestmentStatus::Active),
            "paused" => Ok(InvestmentStatus::Paused),
            "completed" => Ok(InvestmentStatus::Completed),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvestmentStatus::Active => "active",
            InvestmentStatus::Paused => "paused",
            InvestmentStatus::Completed => "completed",
        }
    }
}

/// An accepted plan subscription.
///
/// `earned_profit` is monotonically non-decreasing and never exceeds
/// `expected_profit`; the scheduler and the adjustment ledger are its only
/// writers, serialized by a row lock.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Investment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub amount: Decimal,
    pub rate: Decimal,
    pub cadence: String,
    pub expected_profit: Decimal,
    pub earned_profit: Decimal,
    pub status: String,
    pub is_paused: bool,
    pub next_profit_date: NaiveDateTime,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl Investment {
    pub fn status_enum(&self) -> InvestmentStatus {
        InvestmentStatus::from_str(&self.status).unwrap_or(InvestmentStatus::Active)
    }

    pub fn cadence_enum(&self) -> Cadence {
        Cadence::from_str(&self.cadence).unwrap_or(Cadence::Daily)
    }

    /// Profit still owed before the cap is reached
    pub fn remaining_profit(&self) -> Decimal {
        (self.expected_profit - self.earned_profit).max(Decimal::ZERO)
    }

    /// Gross payout for one tick, before the cap clamp
    pub fn gross_payout(&self) -> Decimal {
        (self.amount * self.rate / Decimal::from(100)).round_dp(2)
    }

    /// One tick's payout clamped so cumulative earnings never exceed
    /// `expected_profit`. Zero means the investment is done.
    pub fn clamped_payout(&self) -> Decimal {
        self.gross_payout().min(self.remaining_profit())
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.status_enum() == InvestmentStatus::Active
            && !self.is_paused
            && self.next_profit_date <= now
    }

    pub fn term_elapsed(&self, now: NaiveDateTime) -> bool {
        now >= self.end_date
    }
}
