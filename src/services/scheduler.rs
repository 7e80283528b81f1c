//! Once-per-day end-of-day report timing.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::info;

/// Decides when the end-of-day report is due.
///
/// The report fires on the first poll at or after the trigger time, at most
/// once per calendar date. Polls need not land on the exact minute.
#[derive(Debug, Clone)]
pub struct ReportScheduler {
    eod_time: NaiveTime,
    last_eod_report_date: Option<NaiveDate>,
}

impl ReportScheduler {
    pub fn new(eod_time: NaiveTime) -> Self {
        Self {
            eod_time,
            last_eod_report_date: None,
        }
    }

    pub fn eod_time(&self) -> NaiveTime {
        self.eod_time
    }

    pub fn last_report_date(&self) -> Option<NaiveDate> {
        self.last_eod_report_date
    }

    /// Whether a report is due at local time `now`, without marking it sent.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        now.time() >= self.eod_time
            && self
                .last_eod_report_date
                .map_or(true, |last| last < now.date())
    }

    /// Check and claim today's report slot. Returns true at most once per date.
    pub fn poll(&mut self, now: NaiveDateTime) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.last_eod_report_date = Some(now.date());
        info!("End-of-day report due for {}", now.date());
        true
    }
}
