//! Business calendar clock
//!
//! Every "today" in the system comes from a `Clock`, so sweeps and request
//! dates can be replayed against a fixed date.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use parking_lot::RwLock;

/// Source of the current instant and business date
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date in the business time zone
    fn today(&self) -> NaiveDate;
}

/// Wall clock projected into a fixed time zone
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }
}

/// Clock pinned to a settable date, for tests and replays
#[derive(Debug, Clone)]
pub struct FixedClock {
    date: Arc<RwLock<NaiveDate>>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Arc::new(RwLock::new(date)),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        *self.date.write() = date;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.today()
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now)
    }

    fn today(&self) -> NaiveDate {
        *self.date.read()
    }
}
