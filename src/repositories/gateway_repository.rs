use crate::error::RepositoryError;
use crate::models::PaymentGateway;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// Repository for payment gateway configuration
pub struct GatewayRepository {
    pool: PgPool,
}

/// Parameters for registering a gateway
pub struct NewGateway<'a> {
    pub name: &'a str,
    pub deposit_enabled: bool,
    pub withdraw_enabled: bool,
    pub min_deposit: Decimal,
    pub max_deposit: Decimal,
    pub min_withdraw: Decimal,
    pub max_withdraw: Decimal,
    pub deposit_fee: Decimal,
    pub deposit_fee_type: &'a str,
    pub withdraw_fee: Decimal,
    pub withdraw_fee_type: &'a str,
}

impl GatewayRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, gateway: NewGateway<'_>) -> Result<PaymentGateway, RepositoryError> {
        let created = sqlx::query_as::<_, PaymentGateway>(
            r#"
            INSERT INTO payment_gateways
            (name, deposit_enabled, withdraw_enabled, min_deposit, max_deposit,
             min_withdraw, max_withdraw, deposit_fee, deposit_fee_type,
             withdraw_fee, withdraw_fee_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, name, deposit_enabled, withdraw_enabled, min_deposit, max_deposit,
                      min_withdraw, max_withdraw, deposit_fee, deposit_fee_type,
                      withdraw_fee, withdraw_fee_type, created_at
            "#,
        )
        .bind(gateway.name)
        .bind(gateway.deposit_enabled)
        .bind(gateway.withdraw_enabled)
        .bind(gateway.min_deposit)
        .bind(gateway.max_deposit)
        .bind(gateway.min_withdraw)
        .bind(gateway.max_withdraw)
        .bind(gateway.deposit_fee)
        .bind(gateway.deposit_fee_type)
        .bind(gateway.withdraw_fee)
        .bind(gateway.withdraw_fee_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PaymentGateway>, RepositoryError> {
        let gateway = sqlx::query_as::<_, PaymentGateway>(
            r#"
            SELECT id, name, deposit_enabled, withdraw_enabled, min_deposit, max_deposit,
                   min_withdraw, max_withdraw, deposit_fee, deposit_fee_type,
                   withdraw_fee, withdraw_fee_type, created_at
            FROM payment_gateways
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(gateway)
    }

    pub async fn list(&self) -> Result<Vec<PaymentGateway>, RepositoryError> {
        let gateways = sqlx::query_as::<_, PaymentGateway>(
            r#"
            SELECT id, name, deposit_enabled, withdraw_enabled, min_deposit, max_deposit,
                   min_withdraw, max_withdraw, deposit_fee, deposit_fee_type,
                   withdraw_fee, withdraw_fee_type, created_at
            FROM payment_gateways
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(gateways)
    }
}
