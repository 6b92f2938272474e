//! Cash ledger errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur in the cash ledger
#[derive(Debug, Error)]
pub enum CashError {
    #[error("No active IRP account found for account number {0}")]
    AccountNotFound(String),

    #[error("No active IRP account found for customer {0}; an IRP account must be opened first")]
    NoActiveAccountForCustomer(String),

    #[error("Account {0} is not active")]
    AccountNotActive(String),

    #[error("Insufficient IRP balance: current {balance}, required {required}")]
    InsufficientBalance { balance: Decimal, required: Decimal },

    #[error(
        "Ledger drift detected on account {account_number}: IRP record {irp_balance} != generic record {mirror_balance}"
    )]
    DriftDetected {
        account_number: String,
        irp_balance: Decimal,
        mirror_balance: Decimal,
    },

    #[error("Zero-amount movements are not posted")]
    ZeroAmount,

    #[error("Storage failure: {0}")]
    Storage(#[from] PortError),
}
