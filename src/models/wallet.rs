//! Wallet model for per-user fund tracking

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One wallet per user, created at registration.
///
/// `balance` is spendable; `reserved` holds funds pulled out of balance by
/// pending withdrawal requests until the request reaches a terminal state.
/// The balance only moves through a terminal transaction, a completed
/// distribution, an adjustment, or a commission credit.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: Uuid,
    pub balance: Decimal,
    pub reserved: Decimal,
    pub total_deposited: Decimal,
    pub total_withdrawn: Decimal,
    pub total_invested: Decimal,
    pub total_profit: Decimal,
    pub updated_at: NaiveDateTime,
}

impl Wallet {
    /// Check whether the spendable balance covers `amount`
    pub fn can_cover(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }
}
