use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How a gateway fee is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeType {
    /// Flat amount per transaction
    Fixed,
    /// Percent of the transaction amount
    Percent,
}

impl FeeType {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "fixed" => Ok(FeeType::Fixed),
            "percent" => Ok(FeeType::Percent),
            _ => Err(format!("Invalid fee type: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeeType::Fixed => "fixed",
            FeeType::Percent => "percent",
        }
    }
}

/// Payment gateway configuration: enablement, limits and fee parameters
/// consumed by the transaction workflow
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PaymentGateway {
    pub id: Uuid,
    pub name: String,
    pub deposit_enabled: bool,
    pub withdraw_enabled: bool,
    pub min_deposit: Decimal,
    pub max_deposit: Decimal,
    pub min_withdraw: Decimal,
    pub max_withdraw: Decimal,
    pub deposit_fee: Decimal,
    pub deposit_fee_type: String,
    pub withdraw_fee: Decimal,
    pub withdraw_fee_type: String,
    pub created_at: NaiveDateTime,
}

/// Compute a fee from its amount and type, rounded to cents
pub fn compute_fee(amount: Decimal, fee: Decimal, fee_type: FeeType) -> Decimal {
    match fee_type {
        FeeType::Fixed => fee,
        FeeType::Percent => (amount * fee / Decimal::from(100)).round_dp(2),
    }
}

impl PaymentGateway {
    pub fn deposit_fee_for(&self, amount: Decimal) -> Decimal {
        let fee_type = FeeType::from_str(&self.deposit_fee_type).unwrap_or(FeeType::Percent);
        compute_fee(amount, self.deposit_fee, fee_type)
    }

    pub fn withdraw_fee_for(&self, amount: Decimal) -> Decimal {
        let fee_type = FeeType::from_str(&self.withdraw_fee_type).unwrap_or(FeeType::Percent);
        compute_fee(amount, self.withdraw_fee, fee_type)
    }

    pub fn deposit_in_range(&self, amount: Decimal) -> bool {
        amount >= self.min_deposit && amount <= self.max_deposit
    }

    pub fn withdraw_in_range(&self, amount: Decimal) -> bool {
        amount >= self.min_withdraw && amount <= self.max_withdraw
    }
}
