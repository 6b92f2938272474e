//! Immutable statement entries and reference id generation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use core_kernel::CashEntryId;

/// Direction of a cash movement from the account's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryDirection {
    /// Money into the account
    Credit,
    /// Money out of the account
    Debit,
}

/// Statement category for an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryCategory {
    /// Fund purchase (debit) or redemption proceeds (credit)
    Investment,
    /// Deposit principal movement
    Deposit,
    /// Interest credited by the accrual/maturity jobs
    Interest,
    /// Contribution paid into the IRP sleeve
    Contribution,
}

impl EntryCategory {
    /// Short tag used inside generated reference ids
    pub fn reference_tag(&self) -> &'static str {
        match self {
            EntryCategory::Investment => "FP",
            EntryCategory::Deposit => "DP",
            EntryCategory::Interest => "IN",
            EntryCategory::Contribution => "CT",
        }
    }
}

/// An immutable statement line against the generic account record
///
/// Entries are the audit trail: they are appended by the synchronizer and
/// never mutated. The balance-after snapshot lets a statement render without
/// replaying history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashEntry {
    /// Unique identifier
    pub id: CashEntryId,
    /// Account the movement was posted to
    pub account_number: String,
    /// Movement direction
    pub direction: EntryDirection,
    /// Statement category
    pub category: EntryCategory,
    /// Absolute amount moved
    pub amount: Decimal,
    /// Balance after this movement was applied
    pub balance_after: Decimal,
    /// Human-readable description (e.g. fund name and class)
    pub description: String,
    /// Traceable reference id, e.g. `HANA-IRP-FP-1735689600000-0042`
    pub reference: String,
    /// When the movement was posted
    pub posted_at: DateTime<Utc>,
}

impl CashEntry {
    /// Creates a new statement entry
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        account_number: impl Into<String>,
        direction: EntryDirection,
        category: EntryCategory,
        amount: Decimal,
        balance_after: Decimal,
        description: impl Into<String>,
        reference: impl Into<String>,
        posted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CashEntryId::new_v7(),
            account_number: account_number.into(),
            direction,
            category,
            amount,
            balance_after,
            description: description.into(),
            reference: reference.into(),
            posted_at,
        }
    }
}

/// Generates human-traceable reference ids for statement entries
///
/// Format: `{BANK}-IRP-{TAG}-{millis}-{seq}`. The sequence counter makes ids
/// unique even when two postings land in the same millisecond.
#[derive(Debug)]
pub struct ReferenceGenerator {
    bank_code: String,
    sequence: AtomicU64,
}

impl ReferenceGenerator {
    /// Creates a generator for the given bank code
    pub fn new(bank_code: impl Into<String>) -> Self {
        Self {
            bank_code: bank_code.into(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Produces the next reference id
    pub fn next(&self, category: EntryCategory, at: DateTime<Utc>) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) % 10_000;
        format!(
            "{}-IRP-{}-{}-{:04}",
            self.bank_code,
            category.reference_tag(),
            at.timestamp_millis(),
            seq
        )
    }
}

impl Default for ReferenceGenerator {
    fn default() -> Self {
        Self::new("HANA")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reference_format() {
        let generator = ReferenceGenerator::new("HANA");
        let reference = generator.next(EntryCategory::Investment, Utc::now());
        assert!(reference.starts_with("HANA-IRP-FP-"));
        assert!(reference.ends_with("-0000"));
    }

    #[test]
    fn test_references_are_unique_within_a_millisecond() {
        let generator = ReferenceGenerator::default();
        let at = Utc::now();
        let a = generator.next(EntryCategory::Interest, at);
        let b = generator.next(EntryCategory::Interest, at);
        assert_ne!(a, b);
    }

    #[test]
    fn test_entry_captures_balance_after() {
        let entry = CashEntry::new(
            "110-123-456",
            EntryDirection::Debit,
            EntryCategory::Investment,
            dec!(1000000),
            dec!(4000000),
            "Fund purchase - Global Equity (C-e)",
            "HANA-IRP-FP-1-0000",
            Utc::now(),
        );
        assert_eq!(entry.balance_after, dec!(4000000));
        assert_eq!(entry.direction, EntryDirection::Debit);
    }
}
