//! Clock abstraction and calendar helpers
//!
//! The subscription engine and the deposit scheduler never read the system
//! clock directly. They take a [`Clock`], which makes settlement dates,
//! holding periods, and accrual windows deterministic under test and keeps
//! calendar-date idempotency keys explicit.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use std::sync::Arc;

/// A source of the current instant and business date
pub trait Clock: Send + Sync {
    /// Returns the current UTC instant
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current business date
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Production clock backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a fixed instant, for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Creates a clock pinned to midnight UTC of the given date
    pub fn on_date(date: NaiveDate) -> Self {
        Self(date.and_hms_opt(0, 0, 0).expect("valid midnight").and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Shared handle to a clock implementation
pub type SharedClock = Arc<dyn Clock>;

/// Calendar days elapsed between two dates (`end - start`)
pub fn elapsed_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Settlement date for a trade: trade date plus the product's T+N lag
pub fn settlement_date(trade_date: NaiveDate, settle_days: u32) -> NaiveDate {
    trade_date + Duration::days(i64::from(settle_days))
}

/// Adds contract months to a date, clamping to the end of the target month
///
/// A deposit opened on Jan 31 with a one-month term matures on Feb 28/29.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months as i32;
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;
    let day = date.day();
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| {
        let last = last_day_of_month(year, month);
        NaiveDate::from_ymd_opt(year, month, last).expect("valid end of month")
    })
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let first_of_next = NaiveDate::from_ymd_opt(ny, nm, 1).expect("valid first of month");
    (first_of_next - Duration::days(1)).day()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_today() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let clock = FixedClock::on_date(date);
        assert_eq!(clock.today(), date);
    }

    #[test]
    fn test_elapsed_days() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(elapsed_days(start, end), 30);
    }

    #[test]
    fn test_settlement_date_t_plus_2() {
        let trade = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        assert_eq!(
            settlement_date(trade, 2),
            NaiveDate::from_ymd_opt(2025, 7, 2).unwrap()
        );
    }

    #[test]
    fn test_add_months_simple() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(add_months(date, 12), NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        assert_eq!(add_months(date, 1), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
    }

    #[test]
    fn test_add_months_across_year_boundary() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 30).unwrap();
        assert_eq!(add_months(date, 3), NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
    }
}
