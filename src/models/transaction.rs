//! Transaction model and approval state machine

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Transaction direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Withdraw,
}

impl TransactionType {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "deposit" => Ok(TransactionType::Deposit),
            "withdraw" => Ok(TransactionType::Withdraw),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdraw => "withdraw",
        }
    }
}

/// Approval workflow status.
///
/// `pending -> processing -> {completed | rejected}` plus
/// `pending -> cancelled`. Terminal statuses permit no transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Processing,
    Completed,
    Rejected,
    Cancelled,
}

impl TransactionStatus {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TransactionStatus::Pending),
            "processing" => Ok(TransactionStatus::Processing),
            "completed" => Ok(TransactionStatus::Completed),
            "rejected" => Ok(TransactionStatus::Rejected),
            "cancelled" => Ok(TransactionStatus::Cancelled),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Processing => "processing",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Rejected => "rejected",
            TransactionStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Completed
                | TransactionStatus::Rejected
                | TransactionStatus::Cancelled
        )
    }

    /// Whether the workflow permits moving from `self` to `next`
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        use TransactionStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Completed)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Processing, Completed)
                | (Processing, Rejected)
        )
    }
}

/// One deposit or withdrawal attempt. Never hard-deleted; terminal rows
/// are immutable.
///
/// For deposits `net_amount = amount - fee` is what the wallet receives.
/// For withdrawals `net_amount = amount + fee` is the liability reserved
/// out of the wallet until the request resolves.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub gateway_id: Uuid,
    pub tx_type: String,
    pub amount: Decimal,
    pub fee: Decimal,
    pub net_amount: Decimal,
    pub status: String,
    pub proof_ref: Option<String>,
    pub payout_details: Option<String>,
    pub admin_note: Option<String>,
    pub processed_by: Option<Uuid>,
    pub processed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl Transaction {
    pub fn tx_type_enum(&self) -> Option<TransactionType> {
        TransactionType::from_str(&self.tx_type).ok()
    }

    pub fn status_enum(&self) -> TransactionStatus {
        TransactionStatus::from_str(&self.status).unwrap_or(TransactionStatus::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        self.status_enum().is_terminal()
    }

    pub fn is_withdrawal(&self) -> bool {
        self.tx_type_enum() == Some(TransactionType::Withdraw)
    }
}
