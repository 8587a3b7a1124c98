//! Domain models for the Vestra backend.
//!
//! This module contains all database-backed models representing
//! the core entities of the investment platform.

pub mod adjustment;
pub mod distribution;
pub mod gateway;
pub mod investment;
pub mod plan;
pub mod referral;
pub mod transaction;
pub mod user;
pub mod wallet;

// Re-export all models for convenient access
pub use adjustment::{Adjustment, AdjustmentStatus, AdjustmentType};
pub use distribution::{DistributionStatus, ProfitDistribution};
pub use gateway::{compute_fee, FeeType, PaymentGateway};
pub use investment::{Cadence, Investment, InvestmentStatus};
pub use plan::Plan;
pub use referral::{
    commission_for, CommissionCredit, CommissionEventKind, LevelEarnings, Referral, ReferralStatus,
};
pub use transaction::{Transaction, TransactionStatus, TransactionType};
pub use user::{User, UserRole};
pub use wallet::Wallet;
