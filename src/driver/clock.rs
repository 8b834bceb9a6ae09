//! # Clock
//!
//! Supplies "today" for date-folder sharding so it can be pinned in tests.

use chrono::{Local, NaiveDate};

pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current local calendar date
    fn today(&self) -> NaiveDate;
}

/// Wall-clock date in the local timezone
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
