//! Fund domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::PortError;
use domain_cash::CashError;

/// Errors that can occur in fund operations
///
/// Business-rule violations carry the specific figures involved so the
/// boundary layer can render an exact user-facing message.
#[derive(Debug, Error)]
pub enum FundError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Purchase and redemption amounts must be positive")]
    NonPositiveAmount,

    #[error("Fund class {0} not found")]
    FundClassNotFound(String),

    #[error("Fund class {0} is not currently on sale")]
    FundNotOnSale(String),

    #[error("Amount {amount} is below the minimum initial purchase of {minimum}")]
    BelowMinimumInitial { minimum: Decimal, amount: Decimal },

    #[error("Amount {amount} is below the minimum additional purchase of {minimum}")]
    BelowMinimumAdditional { minimum: Decimal, amount: Decimal },

    #[error("No NAV quote available for fund class {0}")]
    NavUnavailable(String),

    #[error("Position {0} not found")]
    PositionNotFound(String),

    #[error("Position {position_id} does not belong to customer {customer_ci}")]
    PositionNotOwned {
        position_id: String,
        customer_ci: String,
    },

    #[error("Position {0} is already fully redeemed")]
    PositionClosed(String),

    #[error("Cannot sell {requested} units; only {available} held")]
    OverRedemption {
        available: Decimal,
        requested: Decimal,
    },

    #[error(transparent)]
    Cash(#[from] CashError),

    #[error("Storage failure: {0}")]
    Storage(#[from] PortError),
}
