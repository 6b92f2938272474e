//! NAV quotes and the per-class quote book
//!
//! One quote per (fund-class, date). Republishing the same key replaces the
//! stored quote; the platform treats a second publish as a correction of the
//! first, not a new observation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use core_kernel::rounding::half_up_price;
use core_kernel::NavId;

/// A net-asset-value quote for one share class on one date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavQuote {
    /// Unique identifier
    pub id: NavId,
    /// Share class the quote prices
    pub fund_class_code: String,
    /// Valuation date
    pub nav_date: NaiveDate,
    /// NAV per unit, 4 decimal places
    pub nav: Decimal,
    /// When the quote was published
    pub published_at: DateTime<Utc>,
}

impl NavQuote {
    /// Creates a quote, normalizing the NAV to 4 decimal places
    pub fn new(fund_class_code: impl Into<String>, nav_date: NaiveDate, nav: Decimal) -> Self {
        Self {
            id: NavId::new_v7(),
            fund_class_code: fund_class_code.into(),
            nav_date,
            nav: half_up_price(nav),
            published_at: Utc::now(),
        }
    }
}

/// How a NAV was resolved for pricing
#[derive(Debug, Clone)]
pub struct NavResolution {
    /// The quote used
    pub quote: NavQuote,
    /// True when no same-day quote existed and the latest known one was used
    pub fallback: bool,
}

/// In-memory quote book: per class, quotes ordered by date
#[derive(Debug, Default)]
pub struct NavBook {
    quotes: HashMap<String, BTreeMap<NaiveDate, NavQuote>>,
}

impl NavBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a quote, replacing any existing quote for the same (class, date)
    ///
    /// Returns the replaced quote when this publish was a correction.
    pub fn publish(&mut self, quote: NavQuote) -> Option<NavQuote> {
        self.quotes
            .entry(quote.fund_class_code.clone())
            .or_default()
            .insert(quote.nav_date, quote)
    }

    /// Quote for an exact date
    pub fn for_date(&self, fund_class_code: &str, date: NaiveDate) -> Option<&NavQuote> {
        self.quotes.get(fund_class_code)?.get(&date)
    }

    /// Most recent quote on or before the given date
    pub fn latest_on_or_before(&self, fund_class_code: &str, date: NaiveDate) -> Option<&NavQuote> {
        self.quotes
            .get(fund_class_code)?
            .range(..=date)
            .next_back()
            .map(|(_, quote)| quote)
    }

    /// Resolves the pricing NAV: the same-day quote, else the latest earlier one
    pub fn resolve(&self, fund_class_code: &str, date: NaiveDate) -> Option<NavResolution> {
        if let Some(quote) = self.for_date(fund_class_code, date) {
            return Some(NavResolution {
                quote: quote.clone(),
                fallback: false,
            });
        }
        self.latest_on_or_before(fund_class_code, date)
            .map(|quote| NavResolution {
                quote: quote.clone(),
                fallback: true,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_publish_then_lookup() {
        let mut book = NavBook::new();
        book.publish(NavQuote::new("K-GE-Ce", d(2025, 6, 2), dec!(1000.0000)));

        let quote = book.for_date("K-GE-Ce", d(2025, 6, 2)).unwrap();
        assert_eq!(quote.nav, dec!(1000.0000));
    }

    #[test]
    fn test_republish_same_key_is_a_correction() {
        let mut book = NavBook::new();
        book.publish(NavQuote::new("K-GE-Ce", d(2025, 6, 2), dec!(1000.0000)));
        let replaced = book.publish(NavQuote::new("K-GE-Ce", d(2025, 6, 2), dec!(1001.5000)));

        assert_eq!(replaced.unwrap().nav, dec!(1000.0000));
        assert_eq!(
            book.for_date("K-GE-Ce", d(2025, 6, 2)).unwrap().nav,
            dec!(1001.5000)
        );
    }

    #[test]
    fn test_resolve_prefers_same_day() {
        let mut book = NavBook::new();
        book.publish(NavQuote::new("K-GE-Ce", d(2025, 6, 2), dec!(1000.0000)));
        book.publish(NavQuote::new("K-GE-Ce", d(2025, 6, 3), dec!(1010.0000)));

        let resolution = book.resolve("K-GE-Ce", d(2025, 6, 3)).unwrap();
        assert!(!resolution.fallback);
        assert_eq!(resolution.quote.nav, dec!(1010.0000));
    }

    #[test]
    fn test_resolve_falls_back_to_latest() {
        let mut book = NavBook::new();
        book.publish(NavQuote::new("K-GE-Ce", d(2025, 6, 2), dec!(1000.0000)));

        let resolution = book.resolve("K-GE-Ce", d(2025, 6, 5)).unwrap();
        assert!(resolution.fallback);
        assert_eq!(resolution.quote.nav_date, d(2025, 6, 2));
    }

    #[test]
    fn test_resolve_unknown_class() {
        let book = NavBook::new();
        assert!(book.resolve("UNKNOWN", d(2025, 6, 2)).is_none());
    }

    #[test]
    fn test_nav_normalized_to_four_places() {
        let quote = NavQuote::new("K-GE-Ce", d(2025, 6, 2), dec!(1000.00005));
        assert_eq!(quote.nav, dec!(1000.0001));
    }
}
