//! Infrastructure Database Layer
//!
//! PostgreSQL adapters for the domain storage ports, built on SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: each domain port gets one
//! `Pg*` implementation, and the domain crates never see SQL. The dual-record
//! cash invariant is enforced here with row locks, so concurrent movements
//! against one account serialize across processes, not just within one.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, PgCashLedger};
//!
//! let pool = create_pool(DatabaseConfig::from_env()?).await?;
//! let ledger = PgCashLedger::new(pool);
//! ```

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::{
    PgCashLedger, PgDepositStore, PgFundCatalog, PgNavStore, PgPositionStore, PgTradeLog,
};
