//! Deposit Domain
//!
//! Time-deposit positions, the bank's rate tables, and the batch scheduler
//! that accrues interest and settles deposits at (or before) maturity.
//!
//! # Key Concepts
//!
//! - **DepositPosition**: balance = principal + unpaid interest; accrual fills
//!   the unpaid bucket, settlement folds it in
//! - **Rate tables**: annual rates keyed by product type and contract period
//! - **DepositScheduler**: threshold-gated accrual pass and daily maturity
//!   pass, idempotent per calendar date, failures isolated per record

pub mod error;
pub mod interest;
pub mod ports;
pub mod position;
pub mod scheduler;

pub use error::DepositError;
pub use interest::{
    accrual_interest, base_rate, contract_months, early_termination_interest,
    early_termination_rate, maturity_date, maturity_interest,
};
pub use ports::DepositStorePort;
pub use position::{DepositPosition, DepositProductType, DepositStatus};
pub use scheduler::{DepositScheduler, PassSummary, SchedulerConfig, SettlementReceipt};
