use chrono::{DateTime, NaiveTime, TimeDelta, Utc};

use crate::{CoreError, CoreResult};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Day-granular date arithmetic anchored to a single instant.
///
/// "Now" is read once when the clock is created and every predicate is
/// evaluated against that value, so a run that straddles midnight still sees
/// one consistent "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetClock {
    now: DateTime<Utc>,
}

impl ResetClock {
    /// Capture the wall clock
    pub fn now() -> Self {
        Self { now: Utc::now() }
    }

    /// Pin the clock to a known instant
    pub fn fixed(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.now
    }

    /// Shift "now" by whole days. Without `include_time` the result is
    /// truncated to midnight UTC after the shift.
    pub fn date_from_offset(&self, offset_days: i64, include_time: bool) -> CoreResult<DateTime<Utc>> {
        let shifted = TimeDelta::try_days(offset_days)
            .and_then(|delta| self.now.checked_add_signed(delta))
            .ok_or(CoreError::OffsetOutOfRange { offset: offset_days })?;

        if include_time {
            Ok(shifted)
        } else {
            Ok(shifted.date_naive().and_time(NaiveTime::MIN).and_utc())
        }
    }

    /// Whole days from `b` to `a`, rounded to the nearest day with halves
    /// going up (-0.5 days is 0, not -1).
    pub fn days_between(a: DateTime<Utc>, b: DateTime<Utc>) -> i64 {
        ((a - b).num_milliseconds() as f64 / MILLIS_PER_DAY + 0.5).floor() as i64
    }

    /// Same UTC calendar day as now, whatever the time of day
    pub fn is_today(&self, t: DateTime<Utc>) -> bool {
        t.date_naive() == self.now.date_naive()
    }

    /// Earlier than now and on an earlier day
    pub fn is_past_strict(&self, t: DateTime<Utc>) -> bool {
        t < self.now && !self.is_today(t)
    }

    /// Later than now and on a later day
    pub fn is_future_strict(&self, t: DateTime<Utc>) -> bool {
        t > self.now && !self.is_today(t)
    }

    /// Today, or any later instant
    pub fn is_today_or_future(&self, t: DateTime<Utc>) -> bool {
        t > self.now || self.is_today(t)
    }
}
