use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// When deposit approvals feed the commission cascade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositCommissionPolicy {
    /// Only the depositor's first completed deposit pays commissions
    FirstOnly,
    /// Every completed deposit pays commissions
    Every,
}

impl DepositCommissionPolicy {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "first" | "first_only" => Ok(DepositCommissionPolicy::FirstOnly),
            "every" => Ok(DepositCommissionPolicy::Every),
            _ => Err(format!("Invalid deposit commission policy: {}", s)),
        }
    }
}

/// Referral commission settings. The rate schedule is an explicit
/// configuration value so it can be versioned without code change.
#[derive(Debug, Clone)]
pub struct CommissionConfig {
    /// Percent rate per referral level, level 1 first
    pub rates: Vec<Decimal>,
    pub deposit_policy: DepositCommissionPolicy,
}

/// Profit distribution scheduler settings
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub log_level: String,
    pub environment: String,
    pub scheduler: SchedulerConfig,
    pub commission: CommissionConfig,
    /// Auto-cancel pending deposits older than this many hours, if set
    pub pending_deposit_timeout_hours: Option<i64>,
    /// Webhook informed of terminal transaction/distribution events, if set
    pub notify_webhook_url: Option<String>,
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable is required")?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);

        let acquire_timeout_secs = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_secs = env::var("DATABASE_IDLE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(600); // 10 minutes

        let max_lifetime_secs = env::var("DATABASE_MAX_LIFETIME_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1800); // 30 minutes

        let test_before_acquire = env::var("DATABASE_TEST_BEFORE_ACQUIRE")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(true);

        // Validate configuration
        if max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
        })
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/vestra".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl CommissionConfig {
    /// Parse the level schedule from `COMMISSION_RATES`, a comma-separated
    /// percent list ordered level 1 first
    pub fn from_env() -> Result<Self, String> {
        let rates = match env::var("COMMISSION_RATES") {
            Ok(raw) => {
                let parsed: Result<Vec<Decimal>, _> =
                    raw.split(',').map(|s| Decimal::from_str(s.trim())).collect();
                parsed.map_err(|e| format!("Invalid COMMISSION_RATES: {}", e))?
            }
            Err(_) => Self::default_rates(),
        };

        if rates.is_empty() || rates.len() > 7 {
            return Err(format!(
                "COMMISSION_RATES must have between 1 and 7 levels, got {}",
                rates.len()
            ));
        }
        if rates.iter().any(|r| r.is_sign_negative()) {
            return Err("COMMISSION_RATES must be non-negative".to_string());
        }

        let deposit_policy = match env::var("DEPOSIT_COMMISSION_POLICY") {
            Ok(raw) => DepositCommissionPolicy::from_str(&raw)?,
            Err(_) => DepositCommissionPolicy::FirstOnly,
        };

        Ok(Self {
            rates,
            deposit_policy,
        })
    }

    /// The platform's standard seven-level schedule, in percent
    pub fn default_rates() -> Vec<Decimal> {
        [8, 4, 3, 2, 1, 1, 1].iter().map(|&r| Decimal::from(r)).collect()
    }
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self {
            rates: Self::default_rates(),
            deposit_policy: DepositCommissionPolicy::FirstOnly,
        }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        let enabled = env::var("SCHEDULER_ENABLED")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(true);

        let interval_secs = env::var("SCHEDULER_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(300); // 5 minutes

        Self {
            enabled,
            interval_secs,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 300,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let database = DatabaseConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let scheduler = SchedulerConfig::from_env();
        let commission = CommissionConfig::from_env()?;

        let pending_deposit_timeout_hours = env::var("PENDING_DEPOSIT_TIMEOUT_HOURS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok());

        let notify_webhook_url = env::var("NOTIFY_WEBHOOK_URL").ok();

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        if let Some(hours) = pending_deposit_timeout_hours {
            if hours <= 0 {
                return Err("PENDING_DEPOSIT_TIMEOUT_HOURS must be greater than 0".to_string());
            }
        }

        Ok(Self {
            database,
            log_level: log_level.to_lowercase(),
            environment: environment.to_lowercase(),
            scheduler,
            commission,
            pending_deposit_timeout_hours,
            notify_webhook_url,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Get database URL (convenience method)
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            log_level: "info".to_string(),
            environment: "development".to_string(),
            scheduler: SchedulerConfig::default(),
            commission: CommissionConfig::default(),
            pending_deposit_timeout_hours: None,
            notify_webhook_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout_secs, 30);
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert!(config.is_development());
        assert!(!config.is_production());
        assert!(config.scheduler.enabled);
        assert_eq!(config.pending_deposit_timeout_hours, None);
    }

    #[test]
    fn test_default_commission_schedule() {
        let rates = CommissionConfig::default_rates();
        assert_eq!(rates.len(), 7);
        assert_eq!(rates[0], Decimal::from(8));
        assert_eq!(rates[6], Decimal::from(1));
        let total: Decimal = rates.iter().sum();
        assert_eq!(total, Decimal::from(20));
    }

    #[test]
    fn test_deposit_policy_parsing() {
        assert_eq!(
            DepositCommissionPolicy::from_str("first").unwrap(),
            DepositCommissionPolicy::FirstOnly
        );
        assert_eq!(
            DepositCommissionPolicy::from_str("EVERY").unwrap(),
            DepositCommissionPolicy::Every
        );
        assert!(DepositCommissionPolicy::from_str("sometimes").is_err());
    }
}
