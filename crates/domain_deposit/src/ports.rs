//! Deposit storage port

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{DomainPort, PortError};

use crate::position::DepositPosition;

/// Storage for deposit positions
#[async_trait]
pub trait DepositStorePort: DomainPort {
    async fn find_by_account(&self, account_number: &str)
        -> Result<Option<DepositPosition>, PortError>;

    /// All ACTIVE deposits
    async fn find_active(&self) -> Result<Vec<DepositPosition>, PortError>;

    /// ACTIVE deposits whose maturity date is exactly `date`
    async fn find_maturing(&self, date: NaiveDate) -> Result<Vec<DepositPosition>, PortError>;

    /// Inserts or updates a deposit
    async fn save(&self, deposit: &DepositPosition) -> Result<(), PortError>;
}
