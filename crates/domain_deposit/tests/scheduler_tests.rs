//! Scheduler batch tests against in-memory adapters

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

use domain_cash::LedgerPort;
use domain_deposit::{
    DepositError, DepositProductType, DepositScheduler, DepositStatus, DepositStorePort,
    SchedulerConfig,
};
use test_utils::{
    assert_dual_balance, day_term_deposit, funded_ledger, general_deposit, DepositBuilder,
    InMemoryDepositStore, StepClock, ACCOUNT,
};

struct Harness {
    scheduler: DepositScheduler,
    store: Arc<InMemoryDepositStore>,
    ledger: Arc<domain_cash::CashLedgerPortAdapter>,
    clock: Arc<StepClock>,
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn harness(today: NaiveDate) -> Harness {
    let store = Arc::new(InMemoryDepositStore::new());
    let ledger = Arc::new(funded_ledger(dec!(1000000)));
    let clock = Arc::new(StepClock::starting(today));
    let scheduler = DepositScheduler::new(
        Arc::clone(&store) as Arc<dyn DepositStorePort>,
        Arc::clone(&ledger) as Arc<dyn LedgerPort>,
        SchedulerConfig::default(),
        clock.clone(),
    );
    Harness {
        scheduler,
        store,
        ledger,
        clock,
    }
}

#[tokio::test]
async fn test_accrual_below_threshold_is_skipped() {
    let h = harness(d(2025, 2, 1));
    h.store.insert(general_deposit(d(2025, 1, 15)));

    let summary = h.scheduler.run_accrual_pass().await.unwrap();
    assert_eq!(summary.examined, 1);
    assert_eq!(summary.processed, 0);

    let deposit = h.store.find_by_account("DEP-0001").await.unwrap().unwrap();
    assert_eq!(deposit.unpaid_interest, Decimal::ZERO);
}

#[tokio::test]
async fn test_accrual_books_floor_rounded_interest() {
    let h = harness(d(2025, 2, 15));
    h.store.insert(general_deposit(d(2025, 1, 15)));

    let summary = h.scheduler.run_accrual_pass().await.unwrap();
    assert_eq!(summary.processed, 1);

    // 10,000,000 * 0.0240 * 31 / 365 = 20,383.56 (floor)
    let deposit = h.store.find_by_account("DEP-0001").await.unwrap().unwrap();
    assert_eq!(deposit.unpaid_interest, dec!(20383.56));
    assert_eq!(deposit.current_balance, dec!(10020383.56));
    assert_eq!(deposit.principal(), dec!(10000000));
    assert_eq!(deposit.last_calculation_date, Some(d(2025, 2, 15)));
}

#[tokio::test]
async fn test_accrual_same_day_rerun_is_noop() {
    let h = harness(d(2025, 2, 15));
    h.store.insert(general_deposit(d(2025, 1, 15)));

    h.scheduler.run_accrual_pass().await.unwrap();
    let first = h.store.find_by_account("DEP-0001").await.unwrap().unwrap();

    let summary = h.scheduler.run_accrual_pass().await.unwrap();
    assert_eq!(summary.processed, 0);
    let second = h.store.find_by_account("DEP-0001").await.unwrap().unwrap();
    assert_eq!(second.unpaid_interest, first.unpaid_interest);
}

#[tokio::test]
async fn test_accrual_compounds_only_settled_principal() {
    let h = harness(d(2025, 2, 15));
    h.store.insert(general_deposit(d(2025, 1, 15)));
    h.scheduler.run_accrual_pass().await.unwrap();

    // 31 more days; base stays the original principal
    h.clock.set_date(d(2025, 3, 18));
    h.scheduler.run_accrual_pass().await.unwrap();

    let deposit = h.store.find_by_account("DEP-0001").await.unwrap().unwrap();
    // second accrual: 10,000,000 * 0.0240 * 31 / 365 again
    assert_eq!(deposit.unpaid_interest, dec!(20383.56) + dec!(20383.56));
    assert_eq!(deposit.principal(), dec!(10000000));
}

#[tokio::test]
async fn test_maturity_settles_and_credits_cash() {
    let h = harness(d(2026, 1, 15));
    h.store.insert(general_deposit(d(2025, 1, 15)));

    let summary = h.scheduler.run_maturity_pass().await.unwrap();
    assert_eq!(summary.processed, 1);

    let deposit = h.store.find_by_account("DEP-0001").await.unwrap().unwrap();
    assert_eq!(deposit.status, DepositStatus::Matured);
    assert_eq!(deposit.unpaid_interest, Decimal::ZERO);
    // 10,000,000 * 0.0240 * 12 / 12 = 240,000
    assert_eq!(deposit.current_balance, dec!(10240000.00));

    // proceeds credited through the dual ledger
    assert_dual_balance(&h.ledger, ACCOUNT, dec!(1000000) + dec!(10240000.00));
}

#[tokio::test]
async fn test_maturity_pass_only_touches_todays_maturities() {
    let h = harness(d(2025, 6, 1));
    h.store.insert(general_deposit(d(2025, 1, 15)));

    let summary = h.scheduler.run_maturity_pass().await.unwrap();
    assert_eq!(summary.examined, 0);

    let deposit = h.store.find_by_account("DEP-0001").await.unwrap().unwrap();
    assert_eq!(deposit.status, DepositStatus::Active);
}

#[tokio::test]
async fn test_day_term_maturity_converts_days_to_months() {
    // 90-day term subscribed 2025-01-15 matures 2025-04-15
    let h = harness(d(2025, 4, 15));
    h.store.insert(day_term_deposit(d(2025, 1, 15)));

    let summary = h.scheduler.run_maturity_pass().await.unwrap();
    assert_eq!(summary.processed, 1);

    let deposit = h.store.find_by_account("DEP-0002").await.unwrap().unwrap();
    // ceil(90/30) = 3 months at 2.02%: 5,000,000 * 0.0202 * 3 / 12 = 25,250
    assert_eq!(deposit.current_balance, dec!(5000000) + dec!(25250.00));
}

#[tokio::test]
async fn test_default_option_flagged_for_rollover() {
    let h = harness(d(2028, 1, 15));
    h.store.insert(
        DepositBuilder::new("DEP-0003")
            .product(DepositProductType::DefaultOption, 36)
            .subscribed_on(d(2025, 1, 15))
            .build(),
    );

    h.scheduler.run_maturity_pass().await.unwrap();

    let deposit = h.store.find_by_account("DEP-0003").await.unwrap().unwrap();
    assert_eq!(deposit.status, DepositStatus::Matured);
    assert!(deposit.rollover_eligible);
}

#[tokio::test]
async fn test_record_failure_does_not_abort_pass() {
    let h = harness(d(2026, 1, 15));
    let mut other = general_deposit(d(2025, 1, 15));
    other.account_number = "DEP-0000".to_string();
    h.store.insert(other);
    h.store.insert(general_deposit(d(2025, 1, 15)));

    // first save fails, second record still settles
    h.store.fail_next_save();
    let summary = h.scheduler.run_maturity_pass().await.unwrap();

    assert_eq!(summary.examined, 2);
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn test_maturity_rerun_after_save_failure_credits_once() {
    let h = harness(d(2026, 1, 15));
    h.store.insert(general_deposit(d(2025, 1, 15)));

    h.store.fail_next_save();
    let first = h.scheduler.run_maturity_pass().await.unwrap();
    assert_eq!(first.failed, 1);

    // the payout was taken back, so the failed attempt left no money behind
    assert_dual_balance(&h.ledger, ACCOUNT, dec!(1000000));
    let deposit = h.store.find_by_account("DEP-0001").await.unwrap().unwrap();
    assert_eq!(deposit.status, DepositStatus::Active);

    // the same-day retry settles and credits exactly once
    let second = h.scheduler.run_maturity_pass().await.unwrap();
    assert_eq!(second.processed, 1);
    assert_dual_balance(&h.ledger, ACCOUNT, dec!(1000000) + dec!(10240000.00));
}

#[tokio::test]
async fn test_early_termination_reverses_credit_on_save_failure() {
    let h = harness(d(2025, 3, 1));
    h.store.insert(general_deposit(d(2025, 1, 15)));

    h.store.fail_next_save();
    let result = h.scheduler.terminate_early("DEP-0001").await;

    assert!(matches!(result, Err(DepositError::Storage(_))));
    assert_dual_balance(&h.ledger, ACCOUNT, dec!(1000000));
    let deposit = h.store.find_by_account("DEP-0001").await.unwrap().unwrap();
    assert_eq!(deposit.status, DepositStatus::Active);
}

#[tokio::test]
async fn test_manual_maturity_processing() {
    let h = harness(d(2026, 1, 15));
    h.store.insert(general_deposit(d(2025, 1, 15)));

    let receipt = h.scheduler.process_maturity_for("DEP-0001").await.unwrap();
    assert_eq!(receipt.interest, dec!(240000.00));
    assert_eq!(receipt.proceeds, dec!(10240000.00));

    let again = h.scheduler.process_maturity_for("DEP-0001").await;
    assert!(matches!(again, Err(DepositError::DepositNotActive(_))));

    let missing = h.scheduler.process_maturity_for("DEP-9999").await;
    assert!(matches!(missing, Err(DepositError::DepositNotFound(_))));
}

#[tokio::test]
async fn test_early_termination_pays_reduced_rate() {
    // 45 days in: flat 0.15% band
    let h = harness(d(2025, 3, 1));
    h.store.insert(general_deposit(d(2025, 1, 15)));

    let receipt = h.scheduler.terminate_early("DEP-0001").await.unwrap();

    assert_eq!(receipt.applied_rate, dec!(0.0015));
    // 10,000,000 * 0.0015 * 45 / 365 = 1,849.31 (floor)
    assert_eq!(receipt.interest, dec!(1849.31));
    assert_eq!(receipt.proceeds, dec!(10001849.31));

    let deposit = h.store.find_by_account("DEP-0001").await.unwrap().unwrap();
    assert_eq!(deposit.status, DepositStatus::Closed);
    assert_dual_balance(&h.ledger, ACCOUNT, dec!(1000000) + dec!(10001849.31));
}

#[tokio::test]
async fn test_early_termination_forfeits_unpaid_interest() {
    let h = harness(d(2025, 2, 15));
    h.store.insert(general_deposit(d(2025, 1, 15)));
    h.scheduler.run_accrual_pass().await.unwrap();

    h.clock.set_date(d(2025, 3, 1));
    let receipt = h.scheduler.terminate_early("DEP-0001").await.unwrap();

    // proceeds based on principal only; the 20,383.56 accrued is forfeited
    assert_eq!(receipt.proceeds, dec!(10001849.31));
}
