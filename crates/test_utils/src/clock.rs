//! Settable clock for multi-day test scenarios

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::RwLock;

use core_kernel::Clock;

/// A clock tests can advance between operations
#[derive(Debug)]
pub struct StepClock {
    now: RwLock<DateTime<Utc>>,
}

impl StepClock {
    /// Starts at midnight UTC of the given date
    pub fn starting(date: NaiveDate) -> Self {
        Self {
            now: RwLock::new(date.and_hms_opt(0, 0, 0).expect("valid midnight").and_utc()),
        }
    }

    /// Moves the clock to midnight UTC of the given date
    pub fn set_date(&self, date: NaiveDate) {
        *self.now.write().expect("clock poisoned") =
            date.and_hms_opt(0, 0, 0).expect("valid midnight").and_utc();
    }

    /// Advances the clock by whole days
    pub fn advance_days(&self, days: i64) {
        let mut now = self.now.write().expect("clock poisoned");
        *now += chrono::Duration::days(days);
    }
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().expect("clock poisoned")
    }
}
