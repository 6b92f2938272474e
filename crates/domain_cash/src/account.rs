//! The two physical balance records behind one logical cash account

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a cash account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Suspended,
    Closed,
}

/// The IRP-specific balance record
///
/// This is the record the retirement product reads: balance plus lifetime
/// contribution totals. It must stay numerically equal to the
/// [`MirrorRecord`] for the same account number after every transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrpRecord {
    /// Account number, the join key to the mirror record
    pub account_number: String,
    /// Customer CI that owns the account
    pub customer_ci: String,
    /// Current cash balance
    pub balance: Decimal,
    /// Total contributions paid in over the account lifetime
    pub total_contribution: Decimal,
    /// Account status
    pub status: AccountStatus,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl IrpRecord {
    /// Opens a new IRP record with an initial balance
    pub fn new(
        account_number: impl Into<String>,
        customer_ci: impl Into<String>,
        opening_balance: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            account_number: account_number.into(),
            customer_ci: customer_ci.into(),
            balance: opening_balance,
            total_contribution: opening_balance,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the account can move money
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// The generic all-accounts balance record
///
/// Statement screens and cross-product views read this one. Balance only;
/// the product detail lives on the IRP record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorRecord {
    /// Account number, the join key to the IRP record
    pub account_number: String,
    /// Current cash balance
    pub balance: Decimal,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl MirrorRecord {
    /// Creates the mirror record for a newly opened account
    pub fn new(account_number: impl Into<String>, opening_balance: Decimal) -> Self {
        Self {
            account_number: account_number.into(),
            balance: opening_balance,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_irp_record_opens_active() {
        let record = IrpRecord::new("110-123-456", "CI-001", dec!(1000000));
        assert!(record.is_active());
        assert_eq!(record.balance, dec!(1000000));
        assert_eq!(record.total_contribution, dec!(1000000));
    }

    #[test]
    fn test_mirror_matches_opening_balance() {
        let irp = IrpRecord::new("110-123-456", "CI-001", dec!(500000));
        let mirror = MirrorRecord::new("110-123-456", dec!(500000));
        assert_eq!(irp.balance, mirror.balance);
    }
}
