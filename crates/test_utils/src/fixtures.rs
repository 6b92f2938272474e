//! Pre-built domain objects for tests

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_cash::CashLedgerPortAdapter;
use domain_deposit::{DepositPosition, DepositProductType};
use domain_fund::{FeeSchedule, FundClass, LoadType, SaleStatus, TradingRule};

/// Default test account number
pub const ACCOUNT: &str = "110-123-456";

/// Default test customer CI
pub const CUSTOMER_CI: &str = "CI-2024-0001";

/// A front-load class with a 30-day 1% redemption fee, matching the worked
/// examples used across the engine tests
pub fn front_load_class() -> FundClass {
    FundClass {
        code: "K55101B-Ce".to_string(),
        fund_code: "K55101B".to_string(),
        fund_name: "Global Equity".to_string(),
        class_code: "C-e".to_string(),
        load_type: LoadType::FrontLoad,
        sale_status: SaleStatus::OnSale,
        fees: FeeSchedule {
            mgmt_bps: 45,
            sales_bps: None,
            trustee_bps: 3,
            admin_bps: 2,
            front_load_pct: Some(dec!(0.01)),
        },
        trading: TradingRule {
            cutoff: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
            buy_settle_days: Some(2),
            redeem_settle_days: Some(3),
            min_initial_amount: dec!(10000),
            min_additional_amount: dec!(1000),
            redemption_fee_rate: Some(dec!(0.01)),
            redemption_fee_days: Some(30),
        },
    }
}

/// A no-load class with no redemption fee and unset settlement lags
pub fn no_load_class() -> FundClass {
    FundClass {
        code: "K55102B-A".to_string(),
        fund_code: "K55102B".to_string(),
        fund_name: "Short-Term Bond".to_string(),
        class_code: "A".to_string(),
        load_type: LoadType::NoLoad,
        sale_status: SaleStatus::OnSale,
        fees: FeeSchedule {
            mgmt_bps: 20,
            sales_bps: None,
            trustee_bps: 2,
            admin_bps: 1,
            front_load_pct: None,
        },
        trading: TradingRule {
            cutoff: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
            buy_settle_days: None,
            redeem_settle_days: None,
            min_initial_amount: dec!(10000),
            min_additional_amount: dec!(1000),
            redemption_fee_rate: None,
            redemption_fee_days: None,
        },
    }
}

/// Ledger adapter with the default account opened at the given balance
pub fn funded_ledger(balance: Decimal) -> CashLedgerPortAdapter {
    let adapter = CashLedgerPortAdapter::default();
    adapter
        .ledger()
        .open_account(ACCOUNT, CUSTOMER_CI, balance)
        .expect("fresh ledger");
    adapter
}

/// A 12-month general deposit of 10,000,000 subscribed on the given date
pub fn general_deposit(subscription_date: NaiveDate) -> DepositPosition {
    DepositPosition::open(
        CUSTOMER_CI,
        "DEP-0001",
        ACCOUNT,
        DepositProductType::General,
        12,
        dec!(10000000),
        subscription_date,
    )
    .expect("supported contract period")
}

/// A 90-day day-term deposit of 5,000,000
pub fn day_term_deposit(subscription_date: NaiveDate) -> DepositPosition {
    DepositPosition::open(
        CUSTOMER_CI,
        "DEP-0002",
        ACCOUNT,
        DepositProductType::DayTerm,
        90,
        dec!(5000000),
        subscription_date,
    )
    .expect("supported contract period")
}
