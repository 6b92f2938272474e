//! Immutable trade records
//!
//! One record per executed purchase or redemption. Records are the audit
//! trail: appended once, never mutated, carrying the cash balance snapshot
//! around the movement they booked.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{PositionId, TradeId};

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// An executed purchase or redemption
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Unique identifier
    pub id: TradeId,
    /// Position the trade moved
    pub position_id: PositionId,
    /// Cash account debited or credited
    pub account_number: String,
    /// Share class traded
    pub fund_class_code: String,
    /// Direction
    pub side: TradeSide,
    /// NAV the trade was priced at
    pub nav: Decimal,
    /// Units bought or sold
    pub units: Decimal,
    /// Gross amount: paid in for BUY, sale proceeds for SELL
    pub gross_amount: Decimal,
    /// Fee charged
    pub fee: Decimal,
    /// Realized profit, SELL only
    pub profit: Option<Decimal>,
    /// Realized profit rate in percent, SELL only
    pub profit_rate: Option<Decimal>,
    /// Cash balance before the movement
    pub balance_before: Decimal,
    /// Cash balance after the movement
    pub balance_after: Decimal,
    /// Trade date
    pub trade_date: NaiveDate,
    /// Settlement date, trade date plus the class's T+N lag
    pub settlement_date: NaiveDate,
    /// Reference id of the cash entry this trade booked
    pub cash_reference: String,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_buy_record_shape() {
        let record = TradeRecord {
            id: TradeId::new_v7(),
            position_id: PositionId::new_v7(),
            account_number: "110-123-456".to_string(),
            fund_class_code: "K-GE-Ce".to_string(),
            side: TradeSide::Buy,
            nav: dec!(1000.0000),
            units: dec!(990.000000),
            gross_amount: dec!(1000000),
            fee: dec!(10000),
            profit: None,
            profit_rate: None,
            balance_before: dec!(5000000),
            balance_after: dec!(4000000),
            trade_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            settlement_date: NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
            cash_reference: "HANA-IRP-FP-1-0000".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(record.balance_before - record.balance_after, dec!(1000000));
        assert!(record.profit.is_none());
    }
}
