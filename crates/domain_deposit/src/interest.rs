//! Deposit rate tables and interest formulas
//!
//! Rates are annual decimals (0.0240 = 2.40%). Interest amounts floor to 2
//! decimal places; early-termination rates truncate at 4.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use core_kernel::rounding::{floor_money, floor_rate};
use core_kernel::temporal::add_months;

use crate::error::DepositError;
use crate::position::DepositProductType;

/// Base annual rate for a product type and contract period
///
/// Month-term products accept 6 months or whole years up to 5; day-term
/// products are banded from 30 days up.
pub fn base_rate(product_type: DepositProductType, contract_period: u32) -> Result<Decimal, DepositError> {
    match product_type {
        DepositProductType::General => general_rate(contract_period),
        DepositProductType::DefaultOption => Ok(dec!(0.0220)),
        DepositProductType::DayTerm => day_term_rate(contract_period),
    }
}

fn general_rate(months: u32) -> Result<Decimal, DepositError> {
    match months {
        6 => Ok(dec!(0.0207)),
        12 => Ok(dec!(0.0240)),
        24 => Ok(dec!(0.0200)),
        36 => Ok(dec!(0.0210)),
        48 => Ok(dec!(0.0200)),
        60 => Ok(dec!(0.0202)),
        other => Err(DepositError::UnsupportedContractPeriod {
            product_type: DepositProductType::General,
            period: other,
        }),
    }
}

fn day_term_rate(days: u32) -> Result<Decimal, DepositError> {
    let rate = match days {
        1825.. => dec!(0.0200),
        1461.. => dec!(0.0200),
        1096.. => dec!(0.0210),
        913.. => dec!(0.0198),
        730.. => dec!(0.0200),
        548.. => dec!(0.0225),
        365.. => dec!(0.0240),
        270.. => dec!(0.0211),
        180.. => dec!(0.0207),
        90.. => dec!(0.0202),
        30.. => dec!(0.0192),
        other => {
            return Err(DepositError::UnsupportedContractPeriod {
                product_type: DepositProductType::DayTerm,
                period: other,
            })
        }
    };
    Ok(rate)
}

/// Interest accrued over elapsed calendar days: `principal * rate * days / 365`
pub fn accrual_interest(principal: Decimal, rate: Decimal, elapsed_days: i64) -> Decimal {
    floor_money(principal * rate * Decimal::from(elapsed_days) / Decimal::from(365))
}

/// Final-period interest at maturity: `principal * rate * months / 12`
pub fn maturity_interest(principal: Decimal, rate: Decimal, months: u32) -> Decimal {
    floor_money(principal * rate * Decimal::from(months) / Decimal::from(12))
}

/// Contract months for the maturity formula
///
/// Day-term contracts convert as `ceil(days / 30)`; month-term contracts use
/// the period as-is.
pub fn contract_months(product_type: DepositProductType, contract_period: u32) -> u32 {
    match product_type {
        DepositProductType::DayTerm => contract_period.div_ceil(30),
        _ => contract_period,
    }
}

/// Maturity date: subscription date plus the contract period
pub fn maturity_date(
    subscription_date: NaiveDate,
    product_type: DepositProductType,
    contract_period: u32,
) -> NaiveDate {
    match product_type {
        DepositProductType::DayTerm => {
            subscription_date + chrono::Duration::days(i64::from(contract_period))
        }
        _ => add_months(subscription_date, contract_period),
    }
}

/// Annual rate applied when a deposit is closed before maturity
///
/// Short holdings earn a flat floor rate; past six months the base rate is
/// scaled by an elapsed-day differential and the elapsed fraction of the
/// contract, floored at 0.20% a year. Default-option products instead earn
/// 80% of base (90% past 32 months). The result truncates at 4 decimals.
pub fn early_termination_rate(
    product_type: DepositProductType,
    base_rate: Decimal,
    elapsed_days: i64,
    contract_days: i64,
) -> Decimal {
    let rate = if product_type == DepositProductType::DefaultOption {
        if elapsed_days < 960 {
            base_rate * dec!(0.80)
        } else {
            base_rate * dec!(0.90)
        }
    } else {
        general_early_rate(base_rate, elapsed_days, contract_days)
    };
    floor_rate(rate)
}

fn general_early_rate(base_rate: Decimal, elapsed_days: i64, contract_days: i64) -> Decimal {
    if elapsed_days < 30 {
        return dec!(0.0010);
    }
    if elapsed_days < 90 {
        return dec!(0.0015);
    }
    if elapsed_days < 180 {
        return dec!(0.0020);
    }
    let differential = if elapsed_days < 270 {
        dec!(0.60)
    } else if elapsed_days < 330 {
        dec!(0.70)
    } else {
        dec!(0.90)
    };
    let elapsed_ratio = (Decimal::from(elapsed_days.min(contract_days)) / Decimal::from(contract_days))
        .round_dp_with_strategy(10, RoundingStrategy::MidpointAwayFromZero);
    let computed = base_rate * differential * elapsed_ratio;
    computed.max(dec!(0.0020))
}

/// Interest paid on early termination: `principal * early_rate * days / 365`
pub fn early_termination_interest(principal: Decimal, early_rate: Decimal, elapsed_days: i64) -> Decimal {
    floor_money(principal * early_rate * Decimal::from(elapsed_days) / Decimal::from(365))
}
