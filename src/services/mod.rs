pub mod adjustment_service;
pub mod commission_cascade;
pub mod investment_service;
pub mod notifier;
pub mod profit_scheduler;
pub mod transaction_workflow;

pub use adjustment_service::AdjustmentService;
pub use commission_cascade::CommissionCascade;
pub use investment_service::InvestmentService;
pub use notifier::EventNotifier;
pub use profit_scheduler::{DistributionRunSummary, ProfitScheduler};
pub use transaction_workflow::TransactionWorkflow;
