use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentType {
    Add,
    Deduct,
}

impl AdjustmentType {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "add" => Ok(AdjustmentType::Add),
            "deduct" => Ok(AdjustmentType::Deduct),
            _ => Err(format!("Invalid adjustment type: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentType::Add => "add",
            AdjustmentType::Deduct => "deduct",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentStatus {
    Active,
    Inactive,
}

impl AdjustmentStatus {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "active" => Ok(AdjustmentStatus::Active),
            "inactive" => Ok(AdjustmentStatus::Inactive),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentStatus::Active => "active",
            AdjustmentStatus::Inactive => "inactive",
        }
    }
}

/// Manual audited entry against an investment's earned profit. Immutable
/// once written; a correction is a new compensating row. `amount` is the
/// applied delta after clamping, so the ledger sums to the wallet movement.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Adjustment {
    pub id: Uuid,
    pub investment_id: Uuid,
    pub amount: Decimal,
    pub adjustment_type: String,
    pub reason: String,
    pub status: String,
    pub created_by: Uuid,
    pub created_at: NaiveDateTime,
}

impl Adjustment {
    pub fn adjustment_type_enum(&self) -> Option<AdjustmentType> {
        AdjustmentType::from_str(&self.adjustment_type).ok()
    }
}
