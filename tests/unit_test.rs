use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;
use vestra_backend::config::CommissionConfig;
use vestra_backend::models::*;

fn sample_gateway() -> PaymentGateway {
    PaymentGateway {
        id: Uuid::new_v4(),
        name: "Bank Transfer".to_string(),
        deposit_enabled: true,
        withdraw_enabled: true,
        min_deposit: Decimal::from(10),
        max_deposit: Decimal::from(100_000),
        min_withdraw: Decimal::from(10),
        max_withdraw: Decimal::from(50_000),
        deposit_fee: Decimal::from(2),
        deposit_fee_type: "percent".to_string(),
        withdraw_fee: Decimal::from(5),
        withdraw_fee_type: "fixed".to_string(),
        created_at: Utc::now().naive_utc(),
    }
}

fn sample_investment(
    amount: Decimal,
    rate: Decimal,
    expected: Decimal,
    earned: Decimal,
) -> Investment {
    let now = Utc::now().naive_utc();
    Investment {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        plan_id: Uuid::new_v4(),
        amount,
        rate,
        cadence: "daily".to_string(),
        expected_profit: expected,
        earned_profit: earned,
        status: "active".to_string(),
        is_paused: false,
        next_profit_date: now - Duration::minutes(1),
        start_date: now - Duration::days(10),
        end_date: now + Duration::days(80),
        created_at: now - Duration::days(10),
    }
}

/// Unit tests for gateway fee computation
#[test]
fn test_percent_deposit_fee() {
    let gateway = sample_gateway();

    // $1,000 through a 2% gateway: fee 20.00, net 980.00
    let amount = Decimal::from(1_000);
    let fee = gateway.deposit_fee_for(amount);
    assert_eq!(fee, Decimal::from(20));
    assert_eq!(amount - fee, Decimal::from(980));
}

#[test]
fn test_fixed_withdraw_fee() {
    let gateway = sample_gateway();

    let fee = gateway.withdraw_fee_for(Decimal::from(500));
    assert_eq!(fee, Decimal::from(5));
}

#[test]
fn test_percent_fee_rounds_to_cents() {
    let fee = compute_fee(
        Decimal::new(3333, 2), // 33.33
        Decimal::from(8),
        FeeType::Percent,
    );
    assert_eq!(fee, Decimal::new(267, 2)); // 2.6664 -> 2.67
}

#[test]
fn test_gateway_limits() {
    let gateway = sample_gateway();

    assert!(gateway.deposit_in_range(Decimal::from(10)));
    assert!(gateway.deposit_in_range(Decimal::from(100_000)));
    assert!(!gateway.deposit_in_range(Decimal::from(9)));
    assert!(!gateway.withdraw_in_range(Decimal::from(50_001)));
}

/// Unit tests for the transaction state machine
#[test]
fn test_terminal_statuses_permit_no_transition() {
    use TransactionStatus::*;

    for terminal in [Completed, Rejected, Cancelled] {
        assert!(terminal.is_terminal());
        for next in [Pending, Processing, Completed, Rejected, Cancelled] {
            assert!(!terminal.can_transition_to(next));
        }
    }
}

#[test]
fn test_workflow_transitions() {
    use TransactionStatus::*;

    assert!(Pending.can_transition_to(Processing));
    assert!(Pending.can_transition_to(Completed));
    assert!(Pending.can_transition_to(Rejected));
    assert!(Pending.can_transition_to(Cancelled));
    assert!(Processing.can_transition_to(Completed));
    assert!(Processing.can_transition_to(Rejected));

    // Cancel is user-only and pre-review
    assert!(!Processing.can_transition_to(Cancelled));
    assert!(!Pending.can_transition_to(Pending));
}

#[test]
fn test_transaction_status_conversion() {
    assert_eq!(TransactionStatus::Pending.as_str(), "pending");
    assert_eq!(
        TransactionStatus::from_str("COMPLETED").unwrap(),
        TransactionStatus::Completed
    );
    assert!(TransactionStatus::from_str("done").is_err());
}

/// Unit tests for cadence and plan math
#[test]
fn test_cadence_intervals() {
    assert_eq!(Cadence::Daily.interval(), Duration::days(1));
    assert_eq!(Cadence::Weekly.interval(), Duration::days(7));
    assert_eq!(Cadence::Monthly.interval(), Duration::days(30));
}

#[test]
fn test_plan_expected_profit() {
    let plan = Plan {
        id: Uuid::new_v4(),
        name: "Starter".to_string(),
        rate: Decimal::new(5, 1), // 0.5% per day
        cadence: "daily".to_string(),
        term_periods: 50,
        min_amount: Decimal::from(100),
        max_amount: Decimal::from(100_000),
        created_at: Utc::now().naive_utc(),
    };

    assert_eq!(
        plan.expected_profit_for(Decimal::from(10_000)),
        Decimal::new(250_000, 2) // 2,500.00
    );
    assert_eq!(plan.term(), Duration::days(50));
}

/// Unit tests for the payout clamp
#[test]
fn test_payout_clamp_pays_only_remainder() {
    // 0.3% of 10,000 = 30 per tick, but only 10 remains before the cap
    let investment = sample_investment(
        Decimal::from(10_000),
        Decimal::new(3, 1),
        Decimal::from(2_500),
        Decimal::from(2_490),
    );

    assert_eq!(investment.gross_payout(), Decimal::from(30));
    assert_eq!(investment.clamped_payout(), Decimal::from(10));
}

#[test]
fn test_payout_clamp_zero_at_cap() {
    let investment = sample_investment(
        Decimal::from(10_000),
        Decimal::new(3, 1),
        Decimal::from(2_500),
        Decimal::from(2_500),
    );

    assert_eq!(investment.remaining_profit(), Decimal::ZERO);
    assert_eq!(investment.clamped_payout(), Decimal::ZERO);
}

#[test]
fn test_due_predicate() {
    let mut investment = sample_investment(
        Decimal::from(1_000),
        Decimal::ONE,
        Decimal::from(250),
        Decimal::ZERO,
    );
    let now = Utc::now().naive_utc();

    assert!(investment.is_due(now));

    investment.is_paused = true;
    assert!(!investment.is_due(now));

    investment.is_paused = false;
    investment.next_profit_date = now + Duration::hours(1);
    assert!(!investment.is_due(now));

    investment.next_profit_date = now - Duration::hours(1);
    investment.status = "completed".to_string();
    assert!(!investment.is_due(now));
}

/// Unit tests for commission math
#[test]
fn test_commission_scenario_depth_three() {
    // C deposits $1,000: level 1 gets 8% = $80, level 2 gets 4% = $40
    let rates = CommissionConfig::default_rates();
    let amount = Decimal::from(1_000);

    assert_eq!(commission_for(amount, rates[0]), Decimal::from(80));
    assert_eq!(commission_for(amount, rates[1]), Decimal::from(40));
}

#[test]
fn test_commission_rounds_to_cents() {
    let amount = Decimal::new(12345, 2); // 123.45
    assert_eq!(
        commission_for(amount, Decimal::from(3)),
        Decimal::new(370, 2) // 3.7035 -> 3.70
    );
}

/// Unit tests for enum conversions
#[test]
fn test_model_enum_conversions() {
    assert_eq!(Cadence::from_str("Weekly").unwrap(), Cadence::Weekly);
    assert_eq!(
        InvestmentStatus::from_str("paused").unwrap(),
        InvestmentStatus::Paused
    );
    assert_eq!(
        DistributionStatus::from_str("failed").unwrap(),
        DistributionStatus::Failed
    );
    assert_eq!(
        AdjustmentType::from_str("deduct").unwrap(),
        AdjustmentType::Deduct
    );
    assert_eq!(
        ReferralStatus::from_str("inactive").unwrap(),
        ReferralStatus::Inactive
    );
    assert_eq!(UserRole::from_str("admin").unwrap(), UserRole::Admin);
    assert!(Cadence::from_str("hourly").is_err());
}

#[test]
fn test_wallet_can_cover() {
    let wallet = Wallet {
        user_id: Uuid::new_v4(),
        balance: Decimal::from(100),
        reserved: Decimal::from(40),
        total_deposited: Decimal::from(140),
        total_withdrawn: Decimal::ZERO,
        total_invested: Decimal::ZERO,
        total_profit: Decimal::ZERO,
        updated_at: Utc::now().naive_utc(),
    };

    assert!(wallet.can_cover(Decimal::from(100)));
    assert!(!wallet.can_cover(Decimal::from(101)));
}

/// Unit tests for error mapping
#[test]
fn test_error_status_codes() {
    use vestra_backend::error::AppError;

    assert_eq!(AppError::Validation("bad".into()).status_code(), 400);
    assert_eq!(AppError::Conflict("race".into()).status_code(), 409);
    assert_eq!(AppError::InsufficientFunds("low".into()).status_code(), 400);
    assert_eq!(AppError::NotFound("gone".into()).status_code(), 404);
    assert!(AppError::Sqlx(sqlx::Error::PoolClosed).is_retryable());
    assert!(!AppError::Validation("bad".into()).is_retryable());
}
