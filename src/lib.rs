//! Vestra Backend Library
//!
//! Core financial engine of the Vestra investment platform: the
//! transaction approval ledger, the profit distribution scheduler and the
//! referral commission cascade. The platform's API layer consumes this
//! crate in-process; transport is out of scope here.

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use database::Database;
use repositories::*;
use std::sync::Arc;

/// Application state containing all repositories
pub struct AppState {
    pub database: Database,
    pub user_repo: Arc<UserRepository>,
    pub wallet_repo: Arc<WalletRepository>,
    pub gateway_repo: Arc<GatewayRepository>,
    pub plan_repo: Arc<PlanRepository>,
    pub transaction_repo: Arc<TransactionRepository>,
    pub investment_repo: Arc<InvestmentRepository>,
    pub distribution_repo: Arc<DistributionRepository>,
    pub adjustment_repo: Arc<AdjustmentRepository>,
    pub referral_repo: Arc<ReferralRepository>,
}

impl AppState {
    /// Create a new AppState with initialized repositories
    pub fn new(pool: sqlx::PgPool) -> Self {
        let database = Database::new(pool.clone());

        Self {
            database,
            user_repo: Arc::new(UserRepository::new(pool.clone())),
            wallet_repo: Arc::new(WalletRepository::new(pool.clone())),
            gateway_repo: Arc::new(GatewayRepository::new(pool.clone())),
            plan_repo: Arc::new(PlanRepository::new(pool.clone())),
            transaction_repo: Arc::new(TransactionRepository::new(pool.clone())),
            investment_repo: Arc::new(InvestmentRepository::new(pool.clone())),
            distribution_repo: Arc::new(DistributionRepository::new(pool.clone())),
            adjustment_repo: Arc::new(AdjustmentRepository::new(pool.clone())),
            referral_repo: Arc::new(ReferralRepository::new(pool)),
        }
    }
}
