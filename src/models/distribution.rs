use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionStatus {
    Pending,
    Completed,
    Failed,
}

impl DistributionStatus {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(DistributionStatus::Pending),
            "completed" => Ok(DistributionStatus::Completed),
            "failed" => Ok(DistributionStatus::Failed),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionStatus::Pending => "pending",
            DistributionStatus::Completed => "completed",
            DistributionStatus::Failed => "failed",
        }
    }
}

/// One scheduler tick applied to an investment. Append-only; the only
/// mutation after creation is the pending -> completed/failed transition.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProfitDistribution {
    pub id: Uuid,
    pub investment_id: Uuid,
    pub amount: Decimal,
    pub cadence: String,
    pub status: String,
    pub distributed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl ProfitDistribution {
    pub fn status_enum(&self) -> DistributionStatus {
        DistributionStatus::from_str(&self.status).unwrap_or(DistributionStatus::Pending)
    }
}
