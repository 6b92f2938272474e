//! Named rounding policies for ledger arithmetic
//!
//! Every monetary figure in the platform is a `rust_decimal::Decimal` rounded
//! through one of the policies below. The conventions are deliberately
//! asymmetric: fees and purchasable units round down, while rates, prices, and
//! return figures round half-up. Call sites must never round inline.
//!
//! # Scales
//!
//! - Money amounts and fees: 2 decimal places, floor
//! - Fund units: 6 decimal places, floor
//! - Rates, percentages, average prices: 4 decimal places, half-up

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Decimal places for monetary amounts
pub const MONEY_SCALE: u32 = 2;

/// Decimal places for fund unit counts
pub const UNIT_SCALE: u32 = 6;

/// Decimal places for rates, percentages, and average prices
pub const RATE_SCALE: u32 = 4;

/// Rounds a monetary amount down to 2 decimal places
///
/// Used for fees, interest, and sale proceeds.
pub fn floor_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero)
}

/// Rounds a unit count down to 6 decimal places
///
/// A buyer never receives a fractional unit sliver the net amount did not pay
/// for, so purchasable units always truncate.
pub fn floor_units(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(UNIT_SCALE, RoundingStrategy::ToZero)
}

/// Rounds a rate or percentage half-up to 4 decimal places
pub fn half_up_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds an average price half-up to 4 decimal places
///
/// Same policy as [`half_up_rate`]; the separate name keeps call sites
/// self-describing (weighted-average NAV vs. return rate).
pub fn half_up_price(value: Decimal) -> Decimal {
    half_up_rate(value)
}

/// Truncates a rate down to 4 decimal places
///
/// Early-termination rates truncate rather than round; the customer never
/// gains a fractional basis point from rounding.
pub fn floor_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(RATE_SCALE, RoundingStrategy::ToZero)
}

/// Converts basis points to a decimal rate (half-up, 4 decimal places)
///
/// # Example
///
/// ```rust
/// use core_kernel::rounding::percent_of_bps;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(percent_of_bps(45), dec!(0.0045));
/// ```
pub fn percent_of_bps(bps: u32) -> Decimal {
    half_up_rate(Decimal::from(bps) / dec!(10000))
}

/// Computes units purchasable for a net amount at the given NAV (floor, 6dp)
///
/// Returns zero when the NAV is zero rather than dividing by it; the caller
/// is expected to have rejected a zero NAV already.
pub fn units_for_amount(net_amount: Decimal, nav: Decimal) -> Decimal {
    if nav.is_zero() {
        return Decimal::ZERO;
    }
    floor_units(net_amount / nav)
}

/// Computes the monetary value of units at the given NAV (floor, 2dp)
pub fn value_of_units(units: Decimal, nav: Decimal) -> Decimal {
    floor_money(units * nav)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_money_truncates() {
        assert_eq!(floor_money(dec!(10000.009)), dec!(10000.00));
        assert_eq!(floor_money(dec!(10000.999)), dec!(10000.99));
    }

    #[test]
    fn test_floor_units_truncates() {
        assert_eq!(floor_units(dec!(990.0000009)), dec!(990.000000));
    }

    #[test]
    fn test_half_up_rate() {
        assert_eq!(half_up_rate(dec!(0.00005)), dec!(0.0001));
        assert_eq!(half_up_rate(dec!(0.00004)), dec!(0.0000));
    }

    #[test]
    fn test_percent_of_bps() {
        assert_eq!(percent_of_bps(45), dec!(0.0045));
        assert_eq!(percent_of_bps(10000), dec!(1.0000));
    }

    #[test]
    fn test_units_for_amount() {
        // Spec example: net 990,000 at NAV 1000.0000 buys exactly 990 units
        assert_eq!(units_for_amount(dec!(990000), dec!(1000.0000)), dec!(990.000000));
    }

    #[test]
    fn test_units_for_amount_zero_nav() {
        assert_eq!(units_for_amount(dec!(1000), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_value_of_units() {
        assert_eq!(value_of_units(dec!(990.000000), dec!(1050.0000)), dec!(1039500.00));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn units_never_exceed_exact_quotient(
            net in 1i64..1_000_000_000i64,
            nav in 1i64..10_000_000i64
        ) {
            let net = Decimal::new(net, 2);
            let nav = Decimal::new(nav, 4);
            let units = units_for_amount(net, nav);
            prop_assert!(units * nav <= net + Decimal::new(1, 6) * nav);
            prop_assert!(units >= Decimal::ZERO);
        }

        #[test]
        fn floor_money_is_idempotent(m in -1_000_000_000i64..1_000_000_000i64) {
            let value = Decimal::new(m, 4);
            prop_assert_eq!(floor_money(floor_money(value)), floor_money(value));
        }
    }
}
