//! Core Kernel - Foundational types and utilities for the retirement platform
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Named rounding policies for money, units, and rates
//! - Strongly-typed identifiers
//! - Clock abstraction and calendar helpers for settlement and accrual
//! - Port infrastructure for swappable storage adapters

pub mod error;
pub mod identifiers;
pub mod ports;
pub mod rounding;
pub mod temporal;

pub use error::CoreError;
pub use identifiers::{CashEntryId, DepositId, NavId, PositionId, TradeId};
pub use ports::{DomainPort, PortError};
pub use rounding::{floor_money, floor_rate, floor_units, half_up_price, half_up_rate, percent_of_bps};
pub use temporal::{add_months, elapsed_days, settlement_date, Clock, FixedClock, SharedClock, SystemClock};
