//! Integration tests for the dual-record cash ledger

use chrono::Utc;
use rust_decimal_macros::dec;

use domain_cash::{CashError, CashLedger, EntryCategory, EntryDirection};

fn ledger() -> CashLedger {
    let ledger = CashLedger::new("HANA");
    ledger
        .open_account("110-123-456", "CI-2024-0001", dec!(5000000))
        .unwrap();
    ledger
}

#[test]
fn test_purchase_then_redemption_statement() {
    let ledger = ledger();
    let at = Utc::now();

    ledger
        .apply(
            "110-123-456",
            dec!(-1000000),
            EntryCategory::Investment,
            "Fund purchase - Global Equity (C-e)",
            at,
        )
        .unwrap();
    ledger
        .apply(
            "110-123-456",
            dec!(1050000),
            EntryCategory::Investment,
            "Fund redemption - Global Equity (C-e)",
            at,
        )
        .unwrap();

    let entries = ledger.entries_for("110-123-456");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].direction, EntryDirection::Debit);
    assert_eq!(entries[0].balance_after, dec!(4000000));
    assert_eq!(entries[1].direction, EntryDirection::Credit);
    assert_eq!(entries[1].balance_after, dec!(5050000));
    assert_eq!(ledger.balance_of("110-123-456").unwrap(), dec!(5050000));
}

#[test]
fn test_reference_ids_carry_category_tags() {
    let ledger = ledger();
    let at = Utc::now();

    let investment = ledger
        .apply("110-123-456", dec!(-100), EntryCategory::Investment, "buy", at)
        .unwrap();
    let interest = ledger
        .apply("110-123-456", dec!(42), EntryCategory::Interest, "interest", at)
        .unwrap();

    assert!(investment.reference.contains("-IRP-FP-"));
    assert!(interest.reference.contains("-IRP-IN-"));
    assert_ne!(investment.reference, interest.reference);
}

#[test]
fn test_unknown_account_is_reported() {
    let ledger = ledger();
    let result = ledger.apply(
        "999-000-000",
        dec!(100),
        EntryCategory::Deposit,
        "deposit",
        Utc::now(),
    );
    assert!(matches!(result, Err(CashError::AccountNotFound(_))));
}

#[test]
fn test_duplicate_account_number_is_refused() {
    let ledger = ledger();
    let result = ledger.open_account("110-123-456", "CI-OTHER", dec!(0));
    assert!(matches!(result, Err(CashError::Storage(_))));
}

#[test]
fn test_failed_debit_leaves_no_statement_trace() {
    let ledger = ledger();
    let before = ledger.entries_for("110-123-456").len();

    let result = ledger.apply(
        "110-123-456",
        dec!(-9000000),
        EntryCategory::Investment,
        "oversized purchase",
        Utc::now(),
    );

    assert!(matches!(result, Err(CashError::InsufficientBalance { .. })));
    assert_eq!(ledger.entries_for("110-123-456").len(), before);
    assert_eq!(ledger.balance_of("110-123-456").unwrap(), dec!(5000000));
}

#[test]
fn test_exact_balance_debit_is_allowed() {
    let ledger = ledger();
    let posting = ledger
        .apply(
            "110-123-456",
            dec!(-5000000),
            EntryCategory::Investment,
            "all-in purchase",
            Utc::now(),
        )
        .unwrap();
    assert_eq!(posting.balance_after, dec!(0));
}
