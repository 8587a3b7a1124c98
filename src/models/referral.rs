//! Referral graph edges and commission records

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    /// Registered but not yet qualified (no completed first deposit)
    Pending,
    Active,
    Inactive,
}

impl ReferralStatus {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ReferralStatus::Pending),
            "active" => Ok(ReferralStatus::Active),
            "inactive" => Ok(ReferralStatus::Inactive),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferralStatus::Pending => "pending",
            ReferralStatus::Active => "active",
            ReferralStatus::Inactive => "inactive",
        }
    }
}

/// What kind of financial event triggered a cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommissionEventKind {
    Deposit,
    Profit,
}

impl CommissionEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionEventKind::Deposit => "deposit",
            CommissionEventKind::Profit => "profit",
        }
    }
}

/// Edge in the referral graph: `referrer_id` is `level` hops above
/// `referred_user_id`. One edge per (referrer, referred) pair.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Referral {
    pub id: Uuid,
    pub referrer_id: Uuid,
    pub referred_user_id: Uuid,
    pub level: i32,
    pub commission_rate: Decimal,
    pub total_earnings: Decimal,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl Referral {
    pub fn status_enum(&self) -> ReferralStatus {
        ReferralStatus::from_str(&self.status).unwrap_or(ReferralStatus::Pending)
    }

    pub fn is_active(&self) -> bool {
        self.status_enum() == ReferralStatus::Active
    }
}

/// One ancestor's credit from one cascade run
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CommissionCredit {
    pub id: Uuid,
    pub source_id: Uuid,
    pub referral_id: Uuid,
    pub referrer_id: Uuid,
    pub level: i32,
    pub amount: Decimal,
    pub created_at: NaiveDateTime,
}

/// Per-level earnings rollup for the referral breakdown read model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LevelEarnings {
    pub level: i32,
    pub referral_count: i64,
    pub total_earnings: Decimal,
}

/// Commission for one level: `amount * rate / 100`, rounded to cents
pub fn commission_for(amount: Decimal, rate: Decimal) -> Decimal {
    (amount * rate / Decimal::from(100)).round_dp(2)
}
