//! Cash ledger port

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use core_kernel::DomainPort;

use crate::account::IrpRecord;
use crate::entry::{CashEntry, EntryCategory};
use crate::error::CashError;
use crate::ledger::CashPosting;

/// Port through which the fund and deposit domains move cash
///
/// Implementations must apply the dual-record invariant: a movement updates
/// both physical balance records and appends one statement entry atomically,
/// serialized per account.
#[async_trait]
pub trait LedgerPort: DomainPort {
    /// Applies a signed delta to the account; positive credits, negative debits
    async fn apply(
        &self,
        account_number: &str,
        delta: Decimal,
        category: EntryCategory,
        description: &str,
        at: DateTime<Utc>,
    ) -> Result<CashPosting, CashError>;

    /// Returns the current balance of the account
    async fn balance_of(&self, account_number: &str) -> Result<Decimal, CashError>;

    /// Finds the single active account owned by the given customer CI
    async fn find_active_account(&self, customer_ci: &str) -> Result<IrpRecord, CashError>;

    /// Statement entries for the account, oldest first
    async fn entries_for(&self, account_number: &str) -> Result<Vec<CashEntry>, CashError>;
}

/// Wraps the in-memory [`crate::CashLedger`] behind the async port
///
/// The Postgres adapter in `infra_db` is the production implementation; this
/// one backs tests and single-process deployments.
#[derive(Debug, Default)]
pub struct CashLedgerPortAdapter {
    inner: crate::CashLedger,
}

impl CashLedgerPortAdapter {
    pub fn new(inner: crate::CashLedger) -> Self {
        Self { inner }
    }

    /// Access to the wrapped ledger for account management
    pub fn ledger(&self) -> &crate::CashLedger {
        &self.inner
    }
}

impl DomainPort for CashLedgerPortAdapter {}

#[async_trait]
impl LedgerPort for CashLedgerPortAdapter {
    async fn apply(
        &self,
        account_number: &str,
        delta: Decimal,
        category: EntryCategory,
        description: &str,
        at: DateTime<Utc>,
    ) -> Result<CashPosting, CashError> {
        self.inner.apply(account_number, delta, category, description, at)
    }

    async fn balance_of(&self, account_number: &str) -> Result<Decimal, CashError> {
        self.inner.balance_of(account_number)
    }

    async fn find_active_account(&self, customer_ci: &str) -> Result<IrpRecord, CashError> {
        self.inner.find_active_account(customer_ci)
    }

    async fn entries_for(&self, account_number: &str) -> Result<Vec<CashEntry>, CashError> {
        Ok(self.inner.entries_for(account_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_port_adapter_round_trip() {
        let adapter = CashLedgerPortAdapter::default();
        adapter
            .ledger()
            .open_account("110-123-456", "CI-001", dec!(1000000))
            .unwrap();

        let posting = adapter
            .apply(
                "110-123-456",
                dec!(-250000),
                EntryCategory::Investment,
                "Fund purchase",
                Utc::now(),
            )
            .await
            .unwrap();

        assert_eq!(posting.balance_after, dec!(750000));
        assert_eq!(adapter.balance_of("110-123-456").await.unwrap(), dec!(750000));
        assert_eq!(adapter.entries_for("110-123-456").await.unwrap().len(), 1);
    }
}
