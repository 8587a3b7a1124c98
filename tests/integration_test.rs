//! End-to-end flows against a real PostgreSQL instance.
//!
//! Run with `cargo test -- --ignored` once TEST_DATABASE_URL points at a
//! disposable database.

mod helpers;

use helpers::*;
use rust_decimal::Decimal;
use vestra_backend::error::AppError;
use vestra_backend::models::*;

#[tokio::test]
#[ignore = "requires a postgres instance (TEST_DATABASE_URL)"]
async fn deposit_approval_credits_net_amount() {
    let db = TestDatabase::new().await;
    db.cleanup().await;
    let fixtures = TestFixtures::create(&db).await;

    // $1,000 through the 2% gateway
    let deposit = db
        .workflow
        .create_deposit(
            fixtures.user_a.id,
            Decimal::from(1_000),
            fixtures.gateway.id,
            Some("wire-123"),
        )
        .await
        .unwrap();

    assert_eq!(deposit.status_enum(), TransactionStatus::Pending);
    assert_eq!(deposit.fee, Decimal::from(20));
    assert_eq!(deposit.net_amount, Decimal::from(980));

    // Nothing moves before approval
    let wallet = wallet_of(&db, fixtures.user_a.id).await;
    assert_eq!(wallet.balance, Decimal::ZERO);

    let approved = db
        .workflow
        .approve(deposit.id, fixtures.admin.id, Some("verified"))
        .await
        .unwrap();
    assert_eq!(approved.status_enum(), TransactionStatus::Completed);

    let wallet = wallet_of(&db, fixtures.user_a.id).await;
    assert_eq!(wallet.balance, Decimal::from(980));
    assert_eq!(wallet.total_deposited, Decimal::from(1_000));

    // Terminality: a second decision loses
    let err = db
        .workflow
        .reject(deposit.id, fixtures.admin.id, "changed my mind")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a postgres instance (TEST_DATABASE_URL)"]
async fn rejected_withdrawal_releases_reservation() {
    let db = TestDatabase::new().await;
    db.cleanup().await;
    let fixtures = TestFixtures::create(&db).await;

    fund_user(&db, &fixtures, fixtures.user_a.id, Decimal::from(1_000)).await;
    let funded = wallet_of(&db, fixtures.user_a.id).await;
    assert_eq!(funded.balance, Decimal::from(980));

    // $500 withdrawal reserves the funds immediately
    let withdrawal = db
        .workflow
        .create_withdrawal(
            fixtures.user_a.id,
            Decimal::from(500),
            fixtures.gateway.id,
            "IBAN DE00 1234",
        )
        .await
        .unwrap();

    let wallet = wallet_of(&db, fixtures.user_a.id).await;
    assert_eq!(wallet.balance, Decimal::from(480));
    assert_eq!(wallet.reserved, Decimal::from(500));

    // Rejection puts the reserved $500 back
    let rejected = db
        .workflow
        .reject(withdrawal.id, fixtures.admin.id, "suspicious activity")
        .await
        .unwrap();
    assert_eq!(rejected.status_enum(), TransactionStatus::Rejected);
    assert_eq!(rejected.admin_note.as_deref(), Some("suspicious activity"));

    let wallet = wallet_of(&db, fixtures.user_a.id).await;
    assert_eq!(wallet.balance, Decimal::from(980));
    assert_eq!(wallet.reserved, Decimal::ZERO);
    assert_eq!(wallet.total_withdrawn, Decimal::ZERO);

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a postgres instance (TEST_DATABASE_URL)"]
async fn concurrent_withdrawals_cannot_double_spend() {
    let db = TestDatabase::new().await;
    db.cleanup().await;
    let fixtures = TestFixtures::create(&db).await;

    fund_user(&db, &fixtures, fixtures.user_a.id, Decimal::from(1_000)).await;

    // 980 available: the first request reserves 600, the second cannot
    db.workflow
        .create_withdrawal(
            fixtures.user_a.id,
            Decimal::from(600),
            fixtures.gateway.id,
            "IBAN DE00 1234",
        )
        .await
        .unwrap();

    let err = db
        .workflow
        .create_withdrawal(
            fixtures.user_a.id,
            Decimal::from(600),
            fixtures.gateway.id,
            "IBAN DE00 1234",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientFunds(_)));

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a postgres instance (TEST_DATABASE_URL)"]
async fn completed_withdrawal_finalizes_reservation() {
    let db = TestDatabase::new().await;
    db.cleanup().await;
    let fixtures = TestFixtures::create(&db).await;

    fund_user(&db, &fixtures, fixtures.user_a.id, Decimal::from(1_000)).await;

    let withdrawal = db
        .workflow
        .create_withdrawal(
            fixtures.user_a.id,
            Decimal::from(500),
            fixtures.gateway.id,
            "IBAN DE00 1234",
        )
        .await
        .unwrap();

    db.workflow
        .approve(withdrawal.id, fixtures.admin.id, None)
        .await
        .unwrap();

    let wallet = wallet_of(&db, fixtures.user_a.id).await;
    assert_eq!(wallet.balance, Decimal::from(480));
    assert_eq!(wallet.reserved, Decimal::ZERO);
    assert_eq!(wallet.total_withdrawn, Decimal::from(500));

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a postgres instance (TEST_DATABASE_URL)"]
async fn cancel_only_works_from_pending() {
    let db = TestDatabase::new().await;
    db.cleanup().await;
    let fixtures = TestFixtures::create(&db).await;

    let deposit = db
        .workflow
        .create_deposit(
            fixtures.user_a.id,
            Decimal::from(100),
            fixtures.gateway.id,
            None,
        )
        .await
        .unwrap();

    // Under review, the user can no longer cancel
    db.workflow
        .start_review(deposit.id, fixtures.admin.id)
        .await
        .unwrap();

    let err = db
        .workflow
        .cancel(deposit.id, fixtures.user_a.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a postgres instance (TEST_DATABASE_URL)"]
async fn first_deposit_cascades_up_the_referral_chain() {
    let db = TestDatabase::new().await;
    db.cleanup().await;
    let fixtures = TestFixtures::create(&db).await;

    // A <- B <- C: C's first deposit of $1,000
    let approved = fund_user(&db, &fixtures, fixtures.user_c.id, Decimal::from(1_000)).await;

    // B is level 1 (8% = $80), A is level 2 (4% = $40), no level 3 exists
    let wallet_b = wallet_of(&db, fixtures.user_b.id).await;
    let wallet_a = wallet_of(&db, fixtures.user_a.id).await;
    assert_eq!(wallet_b.balance, Decimal::from(80));
    assert_eq!(wallet_a.balance, Decimal::from(40));

    // C's direct edge was activated by the qualifying deposit
    let edge = db
        .referral_repo
        .find_edge(fixtures.user_b.id, fixtures.user_c.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(edge.status_enum(), ReferralStatus::Active);
    assert_eq!(edge.total_earnings, Decimal::from(80));

    // The level-2 edge was materialized by the walk
    let edge = db
        .referral_repo
        .find_edge(fixtures.user_a.id, fixtures.user_c.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(edge.level, 2);
    assert_eq!(edge.total_earnings, Decimal::from(40));

    // Re-invoking the cascade with the same event id is a no-op
    let credited = db
        .cascade
        .distribute(
            approved.id,
            CommissionEventKind::Deposit,
            fixtures.user_c.id,
            Decimal::from(1_000),
        )
        .await
        .unwrap();
    assert_eq!(credited, 0);

    let wallet_b = wallet_of(&db, fixtures.user_b.id).await;
    assert_eq!(wallet_b.balance, Decimal::from(80));

    // Breakdown read model: one edge per level for A
    let breakdown = db
        .referral_repo
        .breakdown_by_level(fixtures.user_a.id)
        .await
        .unwrap();
    assert_eq!(breakdown.len(), 2);
    assert_eq!(breakdown[0].level, 1);
    assert_eq!(breakdown[1].level, 2);
    assert_eq!(breakdown[1].total_earnings, Decimal::from(40));

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a postgres instance (TEST_DATABASE_URL)"]
async fn inactive_edge_is_skipped_without_breaking_the_walk() {
    let db = TestDatabase::new().await;
    db.cleanup().await;
    let fixtures = TestFixtures::create(&db).await;

    // Qualify B's edge first, then deactivate it
    fund_user(&db, &fixtures, fixtures.user_c.id, Decimal::from(100)).await;
    let edge = db
        .referral_repo
        .find_edge(fixtures.user_b.id, fixtures.user_c.id)
        .await
        .unwrap()
        .unwrap();
    db.referral_repo
        .set_status(edge.id, ReferralStatus::Inactive)
        .await
        .unwrap();

    let balance_b_before = wallet_of(&db, fixtures.user_b.id).await.balance;
    let balance_a_before = wallet_of(&db, fixtures.user_a.id).await.balance;

    // A profit-style event for C: B (inactive) skipped, A still credited
    let source = uuid::Uuid::new_v4();
    let credited = db
        .cascade
        .distribute(
            source,
            CommissionEventKind::Profit,
            fixtures.user_c.id,
            Decimal::from(1_000),
        )
        .await
        .unwrap();
    assert_eq!(credited, 1);

    let wallet_b = wallet_of(&db, fixtures.user_b.id).await;
    let wallet_a = wallet_of(&db, fixtures.user_a.id).await;
    assert_eq!(wallet_b.balance, balance_b_before);
    assert_eq!(wallet_a.balance, balance_a_before + Decimal::from(40));

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a postgres instance (TEST_DATABASE_URL)"]
async fn scheduler_pays_once_per_due_date() {
    let db = TestDatabase::new().await;
    db.cleanup().await;
    let fixtures = TestFixtures::create(&db).await;

    fund_user(&db, &fixtures, fixtures.user_a.id, Decimal::from(11_000)).await;

    // $10,000 at 0.5% daily: $50 per tick, expected profit $2,500
    let investment = db
        .investment_service
        .purchase(fixtures.user_a.id, fixtures.plan.id, Decimal::from(10_000))
        .await
        .unwrap();
    assert_eq!(investment.expected_profit, Decimal::from(2_500));

    let balance_after_purchase = wallet_of(&db, fixtures.user_a.id).await.balance;

    db.make_due(investment.id).await;

    // The manual trigger is admin-gated
    let err = db
        .scheduler
        .run_now_as(fixtures.user_a.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let summary = db.scheduler.run_now_as(fixtures.admin.id).await.unwrap();
    assert_eq!(summary.distributed, 1);
    assert_eq!(summary.failed, 0);

    let wallet = wallet_of(&db, fixtures.user_a.id).await;
    assert_eq!(wallet.balance, balance_after_purchase + Decimal::from(50));
    assert_eq!(wallet.total_profit, Decimal::from(50));

    // Immediate rerun: next_profit_date advanced, nothing is due
    let summary = db.scheduler.run_now().await.unwrap();
    assert_eq!(summary.distributed, 0);

    let wallet = wallet_of(&db, fixtures.user_a.id).await;
    assert_eq!(wallet.total_profit, Decimal::from(50));

    let distributions = db
        .distribution_repo
        .list_for_investment(investment.id, 10, 0)
        .await
        .unwrap();
    assert_eq!(distributions.len(), 1);
    assert_eq!(
        distributions[0].status_enum(),
        DistributionStatus::Completed
    );

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a postgres instance (TEST_DATABASE_URL)"]
async fn final_distribution_is_clamped_at_expected_profit() {
    let db = TestDatabase::new().await;
    db.cleanup().await;
    let fixtures = TestFixtures::create(&db).await;

    fund_user(&db, &fixtures, fixtures.user_a.id, Decimal::from(11_000)).await;

    let investment = db
        .investment_service
        .purchase(fixtures.user_a.id, fixtures.plan.id, Decimal::from(10_000))
        .await
        .unwrap();

    // Push earned profit to $2,490 of $2,500; the next $50 tick must pay
    // only the $10 remainder and complete the investment
    db.adjustment_service
        .create(
            investment.id,
            Decimal::from(2_490),
            AdjustmentType::Add,
            "migration backfill",
            fixtures.admin.id,
        )
        .await
        .unwrap();

    db.make_due(investment.id).await;
    let summary = db.scheduler.run_now().await.unwrap();
    assert_eq!(summary.distributed, 1);
    assert_eq!(summary.completed, 1);

    let investment = db
        .investment_repo
        .find_by_id(investment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(investment.earned_profit, Decimal::from(2_500));
    assert_eq!(investment.status_enum(), InvestmentStatus::Completed);

    let distributions = db
        .distribution_repo
        .list_for_investment(investment.id, 10, 0)
        .await
        .unwrap();
    assert_eq!(distributions[0].amount, Decimal::from(10));

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a postgres instance (TEST_DATABASE_URL)"]
async fn paused_investment_is_skipped_until_resumed() {
    let db = TestDatabase::new().await;
    db.cleanup().await;
    let fixtures = TestFixtures::create(&db).await;

    fund_user(&db, &fixtures, fixtures.user_a.id, Decimal::from(1_100)).await;

    let investment = db
        .investment_service
        .purchase(fixtures.user_a.id, fixtures.plan.id, Decimal::from(1_000))
        .await
        .unwrap();

    db.investment_service
        .pause(investment.id, fixtures.admin.id)
        .await
        .unwrap();
    db.make_due(investment.id).await;

    let summary = db.scheduler.run_now().await.unwrap();
    assert_eq!(summary.distributed, 0);

    // Resume recomputes the next payout from now: still nothing due
    let resumed = db
        .investment_service
        .resume(investment.id, fixtures.admin.id)
        .await
        .unwrap();
    assert!(resumed.next_profit_date > chrono::Utc::now().naive_utc());

    let summary = db.scheduler.run_now().await.unwrap();
    assert_eq!(summary.distributed, 0);

    // Non-admins cannot pause
    let err = db
        .investment_service
        .pause(investment.id, fixtures.user_a.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a postgres instance (TEST_DATABASE_URL)"]
async fn adjustments_clamp_and_floor() {
    let db = TestDatabase::new().await;
    db.cleanup().await;
    let fixtures = TestFixtures::create(&db).await;

    fund_user(&db, &fixtures, fixtures.user_a.id, Decimal::from(1_100)).await;

    let investment = db
        .investment_service
        .purchase(fixtures.user_a.id, fixtures.plan.id, Decimal::from(1_000))
        .await
        .unwrap();
    // expected profit: 1,000 * 0.5% * 50 = 250

    let balance_before = wallet_of(&db, fixtures.user_a.id).await.balance;

    // Add beyond the cap: only 250 applies
    let adjustment = db
        .adjustment_service
        .create(
            investment.id,
            Decimal::from(400),
            AdjustmentType::Add,
            "goodwill credit",
            fixtures.admin.id,
        )
        .await
        .unwrap();
    assert_eq!(adjustment.amount, Decimal::from(250));

    let investment_row = db
        .investment_repo
        .find_by_id(investment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(investment_row.earned_profit, Decimal::from(250));

    let wallet = wallet_of(&db, fixtures.user_a.id).await;
    assert_eq!(wallet.balance, balance_before + Decimal::from(250));

    // Deduct beyond earned: floored at the earned amount
    let adjustment = db
        .adjustment_service
        .create(
            investment.id,
            Decimal::from(400),
            AdjustmentType::Deduct,
            "reversing goodwill credit",
            fixtures.admin.id,
        )
        .await
        .unwrap();
    assert_eq!(adjustment.amount, Decimal::from(250));

    let investment_row = db
        .investment_repo
        .find_by_id(investment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(investment_row.earned_profit, Decimal::ZERO);

    // Both rows remain on the ledger
    let history = db
        .adjustment_service
        .list(investment.id, 10, 0)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);

    // Mandatory reason
    let err = db
        .adjustment_service
        .create(
            investment.id,
            Decimal::from(10),
            AdjustmentType::Add,
            "   ",
            fixtures.admin.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a postgres instance (TEST_DATABASE_URL)"]
async fn stale_pending_deposits_are_auto_cancelled() {
    let db = TestDatabase::new().await;
    db.cleanup().await;
    let fixtures = TestFixtures::create(&db).await;

    let fresh = db
        .workflow
        .create_deposit(
            fixtures.user_a.id,
            Decimal::from(100),
            fixtures.gateway.id,
            None,
        )
        .await
        .unwrap();

    let stale = db
        .workflow
        .create_deposit(
            fixtures.user_a.id,
            Decimal::from(100),
            fixtures.gateway.id,
            None,
        )
        .await
        .unwrap();
    db.backdate_transaction(stale.id, 48).await;

    // The workflow is configured with a 24h timeout policy
    let expired = db
        .workflow
        .expire_stale_deposits(chrono::Utc::now().naive_utc())
        .await
        .unwrap();
    assert_eq!(expired, 1);

    let stale = db.transaction_repo.find_by_id(stale.id).await.unwrap().unwrap();
    assert_eq!(stale.status_enum(), TransactionStatus::Cancelled);

    let fresh = db.transaction_repo.find_by_id(fresh.id).await.unwrap().unwrap();
    assert_eq!(fresh.status_enum(), TransactionStatus::Pending);

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a postgres instance (TEST_DATABASE_URL)"]
async fn read_models_paginate_and_filter_by_status() {
    let db = TestDatabase::new().await;
    db.cleanup().await;
    let fixtures = TestFixtures::create(&db).await;

    fund_user(&db, &fixtures, fixtures.user_a.id, Decimal::from(2_000)).await;
    for _ in 0..3 {
        db.workflow
            .create_deposit(
                fixtures.user_a.id,
                Decimal::from(100),
                fixtures.gateway.id,
                None,
            )
            .await
            .unwrap();
    }

    let pending = db
        .workflow
        .list_transactions(
            fixtures.user_a.id,
            Some(TransactionStatus::Pending),
            10,
            0,
        )
        .await
        .unwrap();
    assert_eq!(pending.len(), 3);

    let page = db
        .workflow
        .list_transactions(fixtures.user_a.id, None, 2, 0)
        .await
        .unwrap();
    assert_eq!(page.len(), 2);

    let investment = db
        .investment_service
        .purchase(fixtures.user_a.id, fixtures.plan.id, Decimal::from(1_000))
        .await
        .unwrap();

    let active = db
        .investment_service
        .list_investments(
            fixtures.user_a.id,
            Some(InvestmentStatus::Active),
            10,
            0,
        )
        .await
        .unwrap();
    assert_eq!(active.len(), 1);

    db.make_due(investment.id).await;
    db.scheduler.run_now().await.unwrap();

    let distributions = db
        .distribution_repo
        .list_for_user(fixtures.user_a.id, 10, 0)
        .await
        .unwrap();
    assert_eq!(distributions.len(), 1);

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a postgres instance (TEST_DATABASE_URL)"]
async fn wallet_conservation_across_mixed_operations() {
    let db = TestDatabase::new().await;
    db.cleanup().await;
    let fixtures = TestFixtures::create(&db).await;

    // Deposit 1,000 (net 980), invest 500, one 2.50 distribution,
    // withdraw 100: balance must equal the sum of those movements
    fund_user(&db, &fixtures, fixtures.user_a.id, Decimal::from(1_000)).await;

    let investment = db
        .investment_service
        .purchase(fixtures.user_a.id, fixtures.plan.id, Decimal::from(500))
        .await
        .unwrap();

    db.make_due(investment.id).await;
    db.scheduler.run_now().await.unwrap();

    let withdrawal = db
        .workflow
        .create_withdrawal(
            fixtures.user_a.id,
            Decimal::from(100),
            fixtures.gateway.id,
            "IBAN DE00 1234",
        )
        .await
        .unwrap();
    db.workflow
        .approve(withdrawal.id, fixtures.admin.id, None)
        .await
        .unwrap();

    let wallet = wallet_of(&db, fixtures.user_a.id).await;
    let expected = Decimal::from(980) - Decimal::from(500) + Decimal::new(250, 2)
        - Decimal::from(100);
    assert_eq!(wallet.balance, expected);
    assert_eq!(wallet.reserved, Decimal::ZERO);
    assert_eq!(wallet.total_deposited, Decimal::from(1_000));
    assert_eq!(wallet.total_invested, Decimal::from(500));
    assert_eq!(wallet.total_profit, Decimal::new(250, 2));
    assert_eq!(wallet.total_withdrawn, Decimal::from(100));

    db.cleanup().await;
}
