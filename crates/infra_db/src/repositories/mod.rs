//! Repository implementations of the domain storage ports

pub mod cash;
pub mod deposit;
pub mod fund;

pub use cash::PgCashLedger;
pub use deposit::PgDepositStore;
pub use fund::{PgFundCatalog, PgNavStore, PgPositionStore, PgTradeLog};
