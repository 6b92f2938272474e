//! Property-based test data generators

use proptest::prelude::*;
use rust_decimal::Decimal;

/// A positive monetary amount between 100.00 and 10,000,000.00
pub fn money_amount() -> impl Strategy<Value = Decimal> {
    (10_000i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// A plausible NAV between 100.0000 and 10,000.0000
pub fn nav_price() -> impl Strategy<Value = Decimal> {
    (1_000_000i64..100_000_000i64).prop_map(|raw| Decimal::new(raw, 4))
}

/// An annual rate between 0.10% and 5.00%
pub fn annual_rate() -> impl Strategy<Value = Decimal> {
    (10i64..500i64).prop_map(|raw| Decimal::new(raw, 4))
}

/// One step in a cash movement sequence
#[derive(Debug, Clone, Copy)]
pub enum CashOp {
    Credit(Decimal),
    Debit(Decimal),
}

impl CashOp {
    /// Signed delta this operation applies
    pub fn delta(&self) -> Decimal {
        match self {
            CashOp::Credit(amount) => *amount,
            CashOp::Debit(amount) => -*amount,
        }
    }
}

/// A random sequence of credits and debits
pub fn cash_op_sequence(max_len: usize) -> impl Strategy<Value = Vec<CashOp>> {
    prop::collection::vec(
        (any::<bool>(), 100i64..50_000_000i64).prop_map(|(credit, cents)| {
            let amount = Decimal::new(cents, 2);
            if credit {
                CashOp::Credit(amount)
            } else {
                CashOp::Debit(amount)
            }
        }),
        1..max_len,
    )
}
