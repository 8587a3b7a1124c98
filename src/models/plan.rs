use crate::models::investment::Cadence;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Investment plan: percent rate per cadence tick over a fixed number of
/// periods
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub rate: Decimal,
    pub cadence: String,
    pub term_periods: i32,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub created_at: NaiveDateTime,
}

impl Plan {
    pub fn cadence_enum(&self) -> Cadence {
        Cadence::from_str(&self.cadence).unwrap_or(Cadence::Daily)
    }

    /// Total profit a principal earns over the full term, fixed at purchase
    pub fn expected_profit_for(&self, amount: Decimal) -> Decimal {
        (amount * self.rate / Decimal::from(100) * Decimal::from(self.term_periods)).round_dp(2)
    }

    /// Full term as a duration
    pub fn term(&self) -> chrono::Duration {
        self.cadence_enum().interval() * self.term_periods
    }

    pub fn amount_in_range(&self, amount: Decimal) -> bool {
        amount >= self.min_amount && amount <= self.max_amount
    }
}
