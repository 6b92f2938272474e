//! Tests for the named rounding policies

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::rounding::{
    floor_money, floor_units, half_up_price, half_up_rate, percent_of_bps, units_for_amount,
    value_of_units, MONEY_SCALE, RATE_SCALE, UNIT_SCALE,
};

#[test]
fn test_scales_match_platform_conventions() {
    assert_eq!(MONEY_SCALE, 2);
    assert_eq!(UNIT_SCALE, 6);
    assert_eq!(RATE_SCALE, 4);
}

#[test]
fn test_fee_rounding_is_bank_favorable() {
    // A fee of 10,000.0099 keeps only 10,000.00 for the customer side
    assert_eq!(floor_money(dec!(10000.0099)), dec!(10000.00));
}

#[test]
fn test_unit_rounding_never_grants_extra_units() {
    // 999,999.99 / 1,000.0001 = 999.99989... -> floor at 6dp
    let units = units_for_amount(dec!(999999.99), dec!(1000.0001));
    assert!(units * dec!(1000.0001) <= dec!(999999.99));
}

#[test]
fn test_rate_rounding_is_half_up() {
    assert_eq!(half_up_rate(dec!(3.14155)), dec!(3.1416));
    assert_eq!(half_up_rate(dec!(3.14154)), dec!(3.1415));
    assert_eq!(half_up_price(dec!(1010.10105)), dec!(1010.1011));
}

#[test]
fn test_bps_conversion() {
    // 100 bp = 1%
    assert_eq!(percent_of_bps(100), dec!(0.0100));
    assert_eq!(percent_of_bps(0), Decimal::ZERO.round_dp(4));
}

#[test]
fn test_spec_purchase_example() {
    // Purchase 1,000,000 with 1% front load: fee 10,000, net 990,000,
    // units at NAV 1000.0000 = 990.000000
    let amount = dec!(1000000);
    let fee = floor_money(amount * dec!(0.01));
    assert_eq!(fee, dec!(10000.00));

    let net = amount - fee;
    let units = units_for_amount(net, dec!(1000.0000));
    assert_eq!(units, dec!(990.000000));

    assert_eq!(value_of_units(units, dec!(1000.0000)), dec!(990000.00));
}
