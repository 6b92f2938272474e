//! Storage ports for the fund domain

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{DomainPort, PortError, PositionId};

use crate::fund_class::FundClass;
use crate::nav::NavQuote;
use crate::position::Position;
use crate::trade::TradeRecord;

/// Read access to the sellable share-class catalog
#[async_trait]
pub trait FundCatalogPort: DomainPort {
    /// Looks up a share class by business key
    async fn find_class(&self, code: &str) -> Result<Option<FundClass>, PortError>;
}

/// The NAV quote store
///
/// One quote per (class, date); publishing an existing key replaces the quote.
#[async_trait]
pub trait NavStorePort: DomainPort {
    /// Upserts a quote, returning the replaced one when this was a correction
    async fn publish(&self, quote: NavQuote) -> Result<Option<NavQuote>, PortError>;

    /// Quote for an exact date
    async fn find_for_date(
        &self,
        fund_class_code: &str,
        date: NaiveDate,
    ) -> Result<Option<NavQuote>, PortError>;

    /// Most recent quote on or before the given date
    async fn find_latest(
        &self,
        fund_class_code: &str,
        date: NaiveDate,
    ) -> Result<Option<NavQuote>, PortError>;
}

/// Position storage
#[async_trait]
pub trait PositionStorePort: DomainPort {
    async fn find_by_id(&self, id: PositionId) -> Result<Option<Position>, PortError>;

    /// The customer's open position in a share class, if any
    async fn find_open(
        &self,
        customer_ci: &str,
        fund_class_code: &str,
    ) -> Result<Option<Position>, PortError>;

    /// Inserts or updates a position
    async fn save(&self, position: &Position) -> Result<(), PortError>;

    /// Removes a position outright
    ///
    /// Used to back out a freshly created position when a later booking step
    /// fails; removing an unknown id is not an error.
    async fn delete(&self, id: PositionId) -> Result<(), PortError>;
}

/// Append-only trade log
#[async_trait]
pub trait TradeLogPort: DomainPort {
    async fn append(&self, trade: &TradeRecord) -> Result<(), PortError>;

    /// Trades for one position, oldest first
    async fn find_for_position(&self, id: PositionId) -> Result<Vec<TradeRecord>, PortError>;
}
