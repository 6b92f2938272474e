//! Fund Domain
//!
//! Share classes, NAV quotes, cost-basis positions, and the subscription
//! engine that ties them to the cash ledger.
//!
//! # Key Concepts
//!
//! - **FundClass**: a sellable share class with its fee schedule and trading rule
//! - **NavBook**: one quote per (class, date); republication corrects the quote
//! - **Position**: weighted-average cost basis, `ACTIVE -> PARTIAL_SOLD -> SOLD`
//! - **TradeRecord**: append-only audit record with cash balance snapshots
//! - **SubscriptionEngine**: validates, prices, books cash and position changes

pub mod engine;
pub mod error;
pub mod fees;
pub mod fund_class;
pub mod nav;
pub mod ports;
pub mod position;
pub mod trade;

pub use engine::{
    PurchaseReceipt, PurchaseRequest, RedemptionReceipt, RedemptionRequest, SellQuantity,
    SubscriptionEngine,
};
pub use error::FundError;
pub use fees::{purchase_fee, redemption_fee};
pub use fund_class::{FeeSchedule, FundClass, LoadType, SaleStatus, TradingRule};
pub use nav::{NavBook, NavQuote, NavResolution};
pub use ports::{FundCatalogPort, NavStorePort, PositionStorePort, TradeLogPort};
pub use position::{Position, PositionStatus, RealizedProfit};
pub use trade::{TradeRecord, TradeSide};
