//! Assertion helpers for domain types

use rust_decimal::Decimal;

use domain_cash::CashLedgerPortAdapter;

/// Asserts two decimals are numerically equal regardless of trailing zeros
pub fn assert_decimal_eq(actual: Decimal, expected: Decimal) {
    assert_eq!(
        actual.normalize(),
        expected.normalize(),
        "expected {expected}, got {actual}"
    );
}

/// Asserts both physical balance records agree and hold the expected balance
///
/// `balance_of` refuses a drifted account, so a successful read is itself the
/// dual-record check.
pub fn assert_dual_balance(adapter: &CashLedgerPortAdapter, account: &str, expected: Decimal) {
    let balance = adapter
        .ledger()
        .balance_of(account)
        .expect("ledger records must agree");
    assert_decimal_eq(balance, expected);
}
