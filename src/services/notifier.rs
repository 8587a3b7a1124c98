use crate::models::{ProfitDistribution, Transaction};
use std::time::Duration;
use tracing::{debug, warn};

/// Best-effort dispatch of terminal ledger events to the platform's
/// notification service. Delivery failures are logged and dropped; the
/// ledger is the source of truth, not the inbox.
pub struct EventNotifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl EventNotifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url,
        }
    }

    /// A transaction reached a terminal status
    pub async fn transaction_finalized(&self, transaction: &Transaction) {
        self.post(serde_json::json!({
            "event": "transaction_finalized",
            "transaction_id": transaction.id,
            "user_id": transaction.user_id,
            "type": transaction.tx_type,
            "status": transaction.status,
            "amount": transaction.amount,
            "net_amount": transaction.net_amount,
        }))
        .await;
    }

    /// A profit distribution completed
    pub async fn distribution_completed(&self, distribution: &ProfitDistribution) {
        self.post(serde_json::json!({
            "event": "distribution_completed",
            "distribution_id": distribution.id,
            "investment_id": distribution.investment_id,
            "amount": distribution.amount,
            "distributed_at": distribution.distributed_at,
        }))
        .await;
    }

    async fn post(&self, payload: serde_json::Value) {
        let url = match &self.webhook_url {
            Some(url) => url,
            None => {
                debug!("Notification webhook not configured, dropping event");
                return;
            }
        };

        match self
            .client
            .post(url)
            .json(&payload)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) if !response.status().is_success() => {
                warn!("Notification webhook returned {}", response.status());
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Notification webhook delivery failed: {}", e);
            }
        }
    }
}
