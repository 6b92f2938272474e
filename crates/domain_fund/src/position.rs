//! Fund positions and weighted-average cost basis
//!
//! One position per customer per share class while the holding is non-zero.
//! The cost basis is a true weighted average recomputed on every additional
//! purchase; redemptions price against it regardless of purchase order.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::rounding::{half_up_price, half_up_rate, value_of_units};
use core_kernel::PositionId;

use crate::error::FundError;
use crate::fund_class::FundClass;

/// Lifecycle of a position; transitions run forward only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    /// Holding at full purchased size
    Active,
    /// Units reduced but still above zero
    PartialSold,
    /// Fully redeemed, terminal
    Sold,
}

/// Realized result of one redemption against a position
#[derive(Debug, Clone, Copy)]
pub struct RealizedProfit {
    /// Sale proceeds minus cost basis minus redemption fee
    pub profit: Decimal,
    /// Profit over cost basis, percent, 4 decimal places
    pub profit_rate: Decimal,
}

/// A customer's holding in one share class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Unique identifier
    pub id: PositionId,
    /// Owning customer CI
    pub customer_ci: String,
    /// IRP cash account funding the position
    pub account_number: String,
    /// Share class business key
    pub fund_class_code: String,
    /// Parent fund display name
    pub fund_name: String,
    /// Class designation, e.g. `C-e`
    pub class_code: String,
    /// First purchase date
    pub purchase_date: NaiveDate,
    /// Cumulative gross amount paid in
    pub purchase_amount: Decimal,
    /// Cumulative purchase fees
    pub purchase_fee: Decimal,
    /// Cumulative units purchased
    pub purchase_units: Decimal,
    /// Weighted-average purchase NAV, 4 decimal places
    pub purchase_nav: Decimal,
    /// Units currently held
    pub current_units: Decimal,
    /// NAV at last valuation
    pub current_nav: Decimal,
    /// Value of held units at last valuation
    pub current_value: Decimal,
    /// Unrealized return at last valuation
    pub total_return: Decimal,
    /// Unrealized return rate, percent
    pub return_rate: Decimal,
    /// All fees paid over the position lifetime
    pub accumulated_fees: Decimal,
    /// Lifecycle status
    pub status: PositionStatus,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Position {
    /// Opens a position from a first purchase
    pub fn open(
        customer_ci: impl Into<String>,
        account_number: impl Into<String>,
        class: &FundClass,
        amount: Decimal,
        fee: Decimal,
        units: Decimal,
        nav: Decimal,
        purchase_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PositionId::new_v7(),
            customer_ci: customer_ci.into(),
            account_number: account_number.into(),
            fund_class_code: class.code.clone(),
            fund_name: class.fund_name.clone(),
            class_code: class.class_code.clone(),
            purchase_date,
            purchase_amount: amount,
            purchase_fee: fee,
            purchase_units: units,
            purchase_nav: nav,
            current_units: units,
            current_nav: nav,
            current_value: value_of_units(units, nav),
            total_return: Decimal::ZERO,
            return_rate: Decimal::ZERO,
            accumulated_fees: fee,
            status: PositionStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// True while the position can still be traded
    pub fn is_open(&self) -> bool {
        self.status != PositionStatus::Sold
    }

    /// Folds an additional purchase into the cost basis
    ///
    /// The weighted-average NAV is recomputed from cumulative net amount over
    /// cumulative units, so it is independent of purchase order.
    pub fn add_purchase(&mut self, amount: Decimal, fee: Decimal, units: Decimal) {
        self.purchase_amount += amount;
        self.purchase_fee += fee;
        self.purchase_units += units;
        self.current_units += units;
        self.accumulated_fees += fee;
        self.purchase_nav =
            half_up_price((self.purchase_amount - self.purchase_fee) / self.purchase_units);
        self.updated_at = Utc::now();
    }

    /// Average gross purchase price per unit, 4 decimal places
    ///
    /// Denominator is the cumulative purchased unit count, not the remaining
    /// one; a partial sale does not change the average.
    pub fn avg_purchase_price(&self) -> Decimal {
        if self.purchase_units.is_zero() {
            return Decimal::ZERO;
        }
        half_up_price(self.purchase_amount / self.purchase_units)
    }

    /// Removes sold units and advances the lifecycle status
    pub fn sell_units(&mut self, units: Decimal, fee: Decimal) -> Result<(), FundError> {
        if !self.is_open() {
            return Err(FundError::PositionClosed(self.id.to_string()));
        }
        if units <= Decimal::ZERO {
            return Err(FundError::NonPositiveAmount);
        }
        if units > self.current_units {
            return Err(FundError::OverRedemption {
                available: self.current_units,
                requested: units,
            });
        }
        self.current_units -= units;
        self.accumulated_fees += fee;
        self.status = if self.current_units.is_zero() {
            PositionStatus::Sold
        } else {
            PositionStatus::PartialSold
        };
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Realized profit for selling `units` at proceeds `sell_amount`
    pub fn realized_profit(
        &self,
        units: Decimal,
        sell_amount: Decimal,
        redemption_fee: Decimal,
    ) -> RealizedProfit {
        let cost_basis = self.avg_purchase_price() * units;
        let profit = sell_amount - cost_basis - redemption_fee;
        let profit_rate = if cost_basis.is_zero() {
            Decimal::ZERO
        } else {
            half_up_rate(profit / cost_basis) * Decimal::from(100)
        };
        RealizedProfit { profit, profit_rate }
    }

    /// Re-marks the position at the given NAV
    pub fn mark_valuation(&mut self, nav: Decimal) {
        self.current_nav = nav;
        self.current_value = value_of_units(self.current_units, nav);
        self.total_return = self.current_value - self.purchase_amount;
        self.return_rate = if self.purchase_amount.is_zero() {
            Decimal::ZERO
        } else {
            half_up_rate(self.total_return / self.purchase_amount) * Decimal::from(100)
        };
        self.updated_at = Utc::now();
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    use core_kernel::rounding::{floor_money, units_for_amount};

    fn seed_position(amount: Decimal, fee: Decimal, nav: Decimal) -> Position {
        let units = units_for_amount(amount - fee, nav);
        let class = crate::fund_class::FundClass {
            code: "K-GE-Ce".to_string(),
            fund_code: "K-GE".to_string(),
            fund_name: "Global Equity".to_string(),
            class_code: "C-e".to_string(),
            load_type: crate::fund_class::LoadType::FrontLoad,
            sale_status: crate::fund_class::SaleStatus::OnSale,
            fees: crate::fund_class::FeeSchedule {
                mgmt_bps: 45,
                sales_bps: None,
                trustee_bps: 3,
                admin_bps: 2,
                front_load_pct: Some(dec!(0.01)),
            },
            trading: crate::fund_class::TradingRule {
                cutoff: chrono::NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
                buy_settle_days: None,
                redeem_settle_days: None,
                min_initial_amount: dec!(0),
                min_additional_amount: dec!(0),
                redemption_fee_rate: None,
                redemption_fee_days: None,
            },
        };
        Position::open(
            "CI-P",
            "110-777-888",
            &class,
            amount,
            fee,
            units,
            nav,
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        )
    }

    proptest! {
        /// Weighted-average NAV after a batch of purchases equals total net
        /// over total units regardless of the order the purchases arrive in.
        #[test]
        fn weighted_average_is_order_independent(
            buys in proptest::collection::vec(
                (10_000i64..100_000_000i64, 5_000i64..50_000_000i64),
                2..8
            )
        ) {
            let purchases: Vec<(Decimal, Decimal, Decimal)> = buys
                .iter()
                .map(|&(amount_cents, nav_raw)| {
                    let amount = Decimal::new(amount_cents, 2);
                    let fee = floor_money(amount * dec!(0.01));
                    let nav = Decimal::new(nav_raw, 4);
                    (amount, fee, nav)
                })
                .collect();

            let build = |order: &[(Decimal, Decimal, Decimal)]| {
                let (amount, fee, nav) = order[0];
                let mut position = seed_position(amount, fee, nav);
                for &(amount, fee, nav) in &order[1..] {
                    let units = units_for_amount(amount - fee, nav);
                    prop_assume!(!units.is_zero());
                    position.add_purchase(amount, fee, units);
                }
                Ok(position)
            };

            let forward = build(&purchases)?;
            let mut reversed_order = purchases.clone();
            reversed_order.reverse();
            let reversed = build(&reversed_order)?;

            prop_assert_eq!(forward.purchase_nav, reversed.purchase_nav);
            prop_assert_eq!(forward.purchase_units, reversed.purchase_units);
            prop_assert_eq!(forward.avg_purchase_price(), reversed.avg_purchase_price());
        }
    }
}
