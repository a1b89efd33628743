use std::sync::Mutex;

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of the current date and instant.
///
/// Booking rules never read the ambient clock directly; they go through this
/// trait so past-date refusals and the evaluation sweep stay reproducible
/// under test.
pub trait Clock: Send + Sync {
    /// Today in the deployment's local calendar.
    fn today(&self) -> NaiveDate;
    /// The current instant, for record timestamps.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a chosen date, movable at will. Used by the demo walkthrough
/// and tests to play out multi-day booking timelines in one process.
#[derive(Debug)]
pub struct FixedClock {
    today: Mutex<NaiveDate>,
}

impl FixedClock {
    pub fn at(today: NaiveDate) -> Self {
        Self {
            today: Mutex::new(today),
        }
    }

    pub fn set_today(&self, today: NaiveDate) {
        *self.today.lock().expect("clock mutex poisoned") = today;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.today.lock().expect("clock mutex poisoned")
    }

    fn now(&self) -> DateTime<Utc> {
        let noon = self
            .today()
            .and_hms_opt(12, 0, 0)
            .expect("noon is a valid time of day");
        DateTime::from_naive_utc_and_offset(noon, Utc)
    }
}
