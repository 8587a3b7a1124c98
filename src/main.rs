//! Vestra Backend Worker
//!
//! Entry point for the financial engine's background worker:
//! - recurring profit distribution scheduler
//! - stale pending-deposit sweeper (when a timeout policy is configured)
//!
//! The request-facing operations live in the library and are served by the
//! platform's API layer.

mod config;
mod database;
mod error;
mod models;
mod repositories;
mod services;

use config::AppConfig;
use database::{create_pool, run_migrations, Database};
use error::{AppError, AppResult};
use repositories::*;
use services::{CommissionCascade, EventNotifier, ProfitScheduler, TransactionWorkflow};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

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

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Initialize tracing/logging with config
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("vestra_backend={},sqlx=warn", config.log_level).into()
            }),
        )
        .init();

    info!("Vestra backend worker starting");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    info!("Connecting to database...");

    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;

    info!("Database connection pool created successfully");
    info!("Max connections: {}", config.database.max_connections);

    // Run migrations
    info!("Running database migrations...");
    run_migrations(&pool, None).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;

    info!("Database migrations completed successfully");

    // =========================================================================
    // CORE SERVICES INITIALIZATION
    // =========================================================================
    let app_state = Arc::new(AppState::new(pool.clone()));
    info!("✓ Application state initialized with repositories");

    let notifier = Arc::new(EventNotifier::new(config.notify_webhook_url.clone()));
    if config.notify_webhook_url.is_some() {
        info!("✓ Notification webhook configured");
    } else {
        warn!("NOTIFY_WEBHOOK_URL not configured - terminal events will not be dispatched");
    }

    let cascade = Arc::new(CommissionCascade::new(
        app_state.user_repo.clone(),
        app_state.referral_repo.clone(),
        config.commission.rates.clone(),
    ));
    info!(
        "✓ Commission cascade initialized ({} levels)",
        config.commission.rates.len()
    );

    let workflow = Arc::new(TransactionWorkflow::new(
        app_state.transaction_repo.clone(),
        app_state.gateway_repo.clone(),
        app_state.user_repo.clone(),
        app_state.referral_repo.clone(),
        cascade.clone(),
        notifier.clone(),
        config.commission.deposit_policy,
        config.pending_deposit_timeout_hours,
    ));
    info!("✓ Transaction workflow initialized");

    let scheduler = Arc::new(ProfitScheduler::new(
        app_state.investment_repo.clone(),
        app_state.distribution_repo.clone(),
        app_state.user_repo.clone(),
        cascade.clone(),
        notifier.clone(),
        config.scheduler.interval(),
    ));

    // =========================================================================
    // BACKGROUND TASKS
    // =========================================================================
    let scheduler_handle = if config.scheduler.enabled {
        let scheduler = scheduler.clone();
        let handle = tokio::spawn(async move {
            scheduler.start().await;
        });
        info!(
            "✓ Profit scheduler started ({}s interval)",
            config.scheduler.interval_secs
        );
        Some(handle)
    } else {
        warn!("SCHEDULER_ENABLED=false - profit distributions must be run manually");
        None
    };

    let sweeper_handle = if config.pending_deposit_timeout_hours.is_some() {
        let workflow = workflow.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(3600));
            loop {
                interval.tick().await;
                let now = chrono::Utc::now().naive_utc();
                if let Err(e) = workflow.expire_stale_deposits(now).await {
                    error!("Stale deposit sweep failed: {}", e);
                }
            }
        });
        info!("✓ Pending-deposit sweeper started (hourly)");
        Some(handle)
    } else {
        None
    };

    info!("Vestra backend worker ready");
    info!("Press Ctrl+C to shutdown gracefully");

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down gracefully...");
        }
        _ = async {
            if let Some(handle) = scheduler_handle {
                handle.await.ok();
            } else {
                futures::future::pending::<()>().await;
            }
        } => {
            error!("Scheduler task exited unexpectedly");
        }
        _ = async {
            if let Some(handle) = sweeper_handle {
                handle.await.ok();
            } else {
                futures::future::pending::<()>().await;
            }
        } => {
            error!("Sweeper task exited unexpectedly");
        }
    }

    info!("Vestra backend worker shutdown complete");
    Ok(())
}
