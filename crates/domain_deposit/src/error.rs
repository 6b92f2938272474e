//! Deposit domain errors

use thiserror::Error;

use core_kernel::PortError;
use domain_cash::CashError;

use crate::position::DepositProductType;

/// Errors that can occur in deposit operations
#[derive(Debug, Error)]
pub enum DepositError {
    #[error("Deposit account {0} not found")]
    DepositNotFound(String),

    #[error("Deposit account {0} is not active")]
    DepositNotActive(String),

    #[error("Unsupported deposit product type code {0}")]
    UnsupportedProductType(i16),

    #[error("Contract period {period} is not offered for product type {product_type:?}")]
    UnsupportedContractPeriod {
        product_type: DepositProductType,
        period: u32,
    },

    #[error(transparent)]
    Cash(#[from] CashError),

    #[error("Storage failure: {0}")]
    Storage(#[from] PortError),
}
