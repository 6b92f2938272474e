//! Time-deposit positions

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::DepositId;

use crate::error::DepositError;
use crate::interest::{base_rate, maturity_date};

/// Deposit product family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepositProductType {
    /// Month-term deposit, contract period in months
    General,
    /// Retirement default-option product, auto-rollover eligible at maturity
    DefaultOption,
    /// Day-term deposit, contract period in days
    DayTerm,
}

impl DepositProductType {
    /// Numeric product-type code used on the wire and in storage
    pub fn code(&self) -> i16 {
        match self {
            DepositProductType::General => 0,
            DepositProductType::DefaultOption => 1,
            DepositProductType::DayTerm => 2,
        }
    }

    pub fn from_code(code: i16) -> Result<Self, DepositError> {
        match code {
            0 => Ok(DepositProductType::General),
            1 => Ok(DepositProductType::DefaultOption),
            2 => Ok(DepositProductType::DayTerm),
            other => Err(DepositError::UnsupportedProductType(other)),
        }
    }
}

/// Deposit lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepositStatus {
    Active,
    /// Reached contractual maturity and settled
    Matured,
    /// Terminated before maturity at the early-close rate
    Closed,
}

/// One customer's holding in a time-deposit product
///
/// `current_balance` always equals principal plus the unpaid-interest bucket,
/// so `principal()` recovers the compounding base at any point. Accrual grows
/// the bucket; only settlement folds interest in for good.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositPosition {
    /// Unique identifier
    pub id: DepositId,
    /// Owning customer CI
    pub customer_ci: String,
    /// Deposit account business key
    pub account_number: String,
    /// IRP cash account proceeds are credited to
    pub irp_account_number: String,
    /// Product family
    pub product_type: DepositProductType,
    /// Contract period: months for month-term products, days for day-term
    pub contract_period: u32,
    /// Annual rate fixed at subscription
    pub rate: Decimal,
    /// Subscription date
    pub subscription_date: NaiveDate,
    /// Contractual maturity date
    pub maturity_date: NaiveDate,
    /// Principal plus unpaid interest
    pub current_balance: Decimal,
    /// Interest accrued but not yet settled
    pub unpaid_interest: Decimal,
    /// Date the accrual job last ran for this deposit
    pub last_calculation_date: Option<NaiveDate>,
    /// Set at maturity for default-option products
    pub rollover_eligible: bool,
    /// Lifecycle status
    pub status: DepositStatus,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl DepositPosition {
    /// Opens a deposit, fixing the rate and maturity date from the contract terms
    pub fn open(
        customer_ci: impl Into<String>,
        account_number: impl Into<String>,
        irp_account_number: impl Into<String>,
        product_type: DepositProductType,
        contract_period: u32,
        principal: Decimal,
        subscription_date: NaiveDate,
    ) -> Result<Self, DepositError> {
        let rate = base_rate(product_type, contract_period)?;
        let now = Utc::now();
        Ok(Self {
            id: DepositId::new_v7(),
            customer_ci: customer_ci.into(),
            account_number: account_number.into(),
            irp_account_number: irp_account_number.into(),
            product_type,
            contract_period,
            rate,
            subscription_date,
            maturity_date: maturity_date(subscription_date, product_type, contract_period),
            current_balance: principal,
            unpaid_interest: Decimal::ZERO,
            last_calculation_date: None,
            rollover_eligible: false,
            status: DepositStatus::Active,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == DepositStatus::Active
    }

    /// Compounding base: balance minus the unpaid bucket
    pub fn principal(&self) -> Decimal {
        self.current_balance - self.unpaid_interest
    }

    /// Books accrued interest into the unpaid bucket
    pub fn accrue(&mut self, interest: Decimal, on: NaiveDate) {
        self.unpaid_interest += interest;
        self.current_balance += interest;
        self.last_calculation_date = Some(on);
        self.updated_at = Utc::now();
    }

    /// Settles the deposit at maturity
    ///
    /// Folds the final-period interest into the balance, empties the unpaid
    /// bucket, and flags default-option products for rollover.
    pub fn settle_maturity(&mut self, final_interest: Decimal, on: NaiveDate) {
        self.current_balance += final_interest;
        self.unpaid_interest = Decimal::ZERO;
        self.last_calculation_date = Some(on);
        self.rollover_eligible = self.product_type == DepositProductType::DefaultOption;
        self.status = DepositStatus::Matured;
        self.updated_at = Utc::now();
    }

    /// Closes the deposit before maturity
    ///
    /// Accrued-but-unpaid interest is forfeited; the early-termination
    /// interest replaces it.
    pub fn settle_early(&mut self, early_interest: Decimal, on: NaiveDate) {
        self.current_balance = self.principal() + early_interest;
        self.unpaid_interest = Decimal::ZERO;
        self.last_calculation_date = Some(on);
        self.status = DepositStatus::Closed;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn open_deposit() -> DepositPosition {
        DepositPosition::open(
            "CI-001",
            "DEP-0001",
            "110-123-456",
            DepositProductType::General,
            12,
            dec!(10000000),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_open_fixes_rate_and_maturity() {
        let deposit = open_deposit();
        assert_eq!(deposit.rate, dec!(0.0240));
        assert_eq!(deposit.maturity_date, NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
        assert!(deposit.is_active());
    }

    #[test]
    fn test_open_rejects_unsupported_period() {
        let result = DepositPosition::open(
            "CI-001",
            "DEP-0002",
            "110-123-456",
            DepositProductType::General,
            7,
            dec!(1000000),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        );
        assert!(matches!(result, Err(DepositError::UnsupportedContractPeriod { .. })));
    }

    #[test]
    fn test_principal_excludes_unpaid_bucket() {
        let mut deposit = open_deposit();
        deposit.accrue(dec!(20383.56), NaiveDate::from_ymd_opt(2025, 2, 15).unwrap());

        assert_eq!(deposit.current_balance, dec!(10020383.56));
        assert_eq!(deposit.unpaid_interest, dec!(20383.56));
        assert_eq!(deposit.principal(), dec!(10000000));
    }

    #[test]
    fn test_settle_maturity_folds_and_flags() {
        let mut deposit = DepositPosition::open(
            "CI-001",
            "DEP-0003",
            "110-123-456",
            DepositProductType::DefaultOption,
            36,
            dec!(10000000),
            NaiveDate::from_ymd_opt(2022, 1, 15).unwrap(),
        )
        .unwrap();
        deposit.accrue(dec!(100000), NaiveDate::from_ymd_opt(2022, 3, 1).unwrap());
        deposit.settle_maturity(dec!(660000.00), NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());

        assert_eq!(deposit.status, DepositStatus::Matured);
        assert_eq!(deposit.unpaid_interest, Decimal::ZERO);
        assert_eq!(deposit.current_balance, dec!(10760000.00));
        assert!(deposit.rollover_eligible);
    }

    #[test]
    fn test_settle_early_forfeits_unpaid() {
        let mut deposit = open_deposit();
        deposit.accrue(dec!(20383.56), NaiveDate::from_ymd_opt(2025, 2, 15).unwrap());
        deposit.settle_early(dec!(1849.31), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());

        assert_eq!(deposit.status, DepositStatus::Closed);
        assert_eq!(deposit.current_balance, dec!(10001849.31));
        assert_eq!(deposit.unpaid_interest, Decimal::ZERO);
    }

    #[test]
    fn test_product_type_codes_round_trip() {
        for code in 0..=2 {
            let product = DepositProductType::from_code(code).unwrap();
            assert_eq!(product.code(), code);
        }
        assert!(DepositProductType::from_code(3).is_err());
    }
}
