//! Purchase and redemption fee computation
//!
//! Pure functions over the class terms. Fees always floor to 2 decimal
//! places; the truncated remainder stays with the customer.

use rust_decimal::Decimal;

use core_kernel::rounding::{floor_money, percent_of_bps};

use crate::fund_class::{FeeSchedule, TradingRule};

/// Fee charged at purchase time
///
/// Front load takes precedence; otherwise the sales fee in basis points
/// applies; a class with neither charges nothing up front.
pub fn purchase_fee(amount: Decimal, schedule: &FeeSchedule) -> Decimal {
    if let Some(pct) = schedule.front_load_pct {
        if !pct.is_zero() {
            return floor_money(amount * pct);
        }
    }
    match schedule.sales_bps {
        Some(bps) if bps > 0 => floor_money(amount * percent_of_bps(bps)),
        _ => Decimal::ZERO,
    }
}

/// Fee charged at redemption time
///
/// Applies only while the holding is younger than the rule's day threshold;
/// once `holding_days >= redemption_fee_days` the fee is waived entirely.
pub fn redemption_fee(sell_amount: Decimal, holding_days: i64, rule: &TradingRule) -> Decimal {
    if !rule.has_redemption_fee() {
        return Decimal::ZERO;
    }
    let days = i64::from(rule.redemption_fee_days.unwrap_or(0));
    let rate = rule.redemption_fee_rate.unwrap_or(Decimal::ZERO);
    if holding_days < days {
        floor_money(sell_amount * rate)
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use rust_decimal_macros::dec;

    fn schedule(front: Option<Decimal>, sales_bps: Option<u32>) -> FeeSchedule {
        FeeSchedule {
            mgmt_bps: 45,
            sales_bps,
            trustee_bps: 3,
            admin_bps: 2,
            front_load_pct: front,
        }
    }

    fn rule(rate: Option<Decimal>, days: Option<u32>) -> TradingRule {
        TradingRule {
            cutoff: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
            buy_settle_days: Some(2),
            redeem_settle_days: Some(3),
            min_initial_amount: dec!(10000),
            min_additional_amount: dec!(1000),
            redemption_fee_rate: rate,
            redemption_fee_days: days,
        }
    }

    #[test]
    fn test_front_load_takes_precedence() {
        let fee = purchase_fee(dec!(1000000), &schedule(Some(dec!(0.01)), Some(30)));
        assert_eq!(fee, dec!(10000.00));
    }

    #[test]
    fn test_sales_bps_when_no_front_load() {
        // 30 bps of 1,000,000 = 3,000
        let fee = purchase_fee(dec!(1000000), &schedule(None, Some(30)));
        assert_eq!(fee, dec!(3000.00));
    }

    #[test]
    fn test_no_load_class_charges_nothing() {
        assert_eq!(purchase_fee(dec!(1000000), &schedule(None, None)), Decimal::ZERO);
        assert_eq!(
            purchase_fee(dec!(1000000), &schedule(Some(Decimal::ZERO), Some(0))),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_purchase_fee_floors() {
        // 1% of 333.33 = 3.3333, floors to 3.33
        let fee = purchase_fee(dec!(333.33), &schedule(Some(dec!(0.01)), None));
        assert_eq!(fee, dec!(3.33));
    }

    #[test]
    fn test_redemption_fee_inside_threshold() {
        let fee = redemption_fee(dec!(1039500), 1, &rule(Some(dec!(0.01)), Some(30)));
        assert_eq!(fee, dec!(10395.00));
    }

    #[test]
    fn test_redemption_fee_waived_at_threshold() {
        let r = rule(Some(dec!(0.01)), Some(30));
        assert_eq!(redemption_fee(dec!(1039500), 30, &r), Decimal::ZERO);
        assert_eq!(redemption_fee(dec!(1039500), 90, &r), Decimal::ZERO);
    }

    #[test]
    fn test_redemption_fee_absent_rule() {
        assert_eq!(redemption_fee(dec!(1000000), 1, &rule(None, None)), Decimal::ZERO);
        assert_eq!(
            redemption_fee(dec!(1000000), 1, &rule(Some(dec!(0.01)), None)),
            Decimal::ZERO
        );
    }
}
