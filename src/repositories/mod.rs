pub mod adjustment_repository;
pub mod distribution_repository;
pub mod gateway_repository;
pub mod investment_repository;
pub mod plan_repository;
pub mod referral_repository;
pub mod transaction_repository;
pub mod user_repository;
pub mod wallet_repository;

// Re-export all repositories for convenient access
pub use adjustment_repository::AdjustmentRepository;
pub use distribution_repository::{DistributionOutcome, DistributionRepository};
pub use gateway_repository::{GatewayRepository, NewGateway};
pub use investment_repository::InvestmentRepository;
pub use plan_repository::PlanRepository;
pub use referral_repository::{PlannedCredit, ReferralRepository};
pub use transaction_repository::TransactionRepository;
pub use user_repository::UserRepository;
pub use wallet_repository::WalletRepository;
