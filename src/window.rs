//! Daily time windows and the wall-clock helpers shared by the scheduler.
//!
//! All times are naive local times. A window is a pair of times of day that
//! repeats on every calendar day of the mission.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::WindowError;

/// A `(start, end)` range of the day, reused once per calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, WindowError> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    /// Build a window from `(hour, minute)` pairs.
    ///
    /// Out-of-range components fall back to midnight and usually fail validation.
    pub fn hm(start: (u32, u32), end: (u32, u32)) -> Result<Self, WindowError> {
        let start = NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap_or_default();
        let end = NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap_or_default();
        Self::new(start, end)
    }

    pub fn validate(&self) -> Result<(), WindowError> {
        if self.start < self.end {
            Ok(())
        } else {
            Err(WindowError::Inverted {
                start: self.start,
                end: self.end,
            })
        }
    }

    pub fn length(&self) -> TimeDelta {
        self.end - self.start
    }

    pub fn start_on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.start)
    }

    pub fn end_on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.end)
    }
}

/// Lunch: taken at most once per day, inside the window, for at most
/// `max_minutes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunchBreak {
    pub window: TimeWindow,
    pub max_minutes: u32,
}

impl LunchBreak {
    pub fn validate(&self) -> Result<(), WindowError> {
        self.window.validate()?;
        if self.max_minutes == 0 {
            return Err(WindowError::ZeroDuration);
        }
        Ok(())
    }

    pub fn bounds_on(&self, date: NaiveDate) -> BreakBounds {
        BreakBounds {
            window_start: self.window.start_on(date),
            window_end: self.window.end_on(date),
            duration: minutes(self.max_minutes),
        }
    }
}

impl Default for LunchBreak {
    fn default() -> Self {
        Self {
            window: TimeWindow {
                start: hm(12, 30),
                end: hm(15, 0),
            },
            max_minutes: 60,
        }
    }
}

/// Prayer: a fixed-length pause somewhere in a window opening at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerBreak {
    pub start: NaiveTime,
    pub duration_minutes: u32,
    pub window_minutes: u32,
}

impl PrayerBreak {
    pub fn validate(&self) -> Result<(), WindowError> {
        if self.duration_minutes == 0 || self.window_minutes == 0 {
            return Err(WindowError::ZeroDuration);
        }
        Ok(())
    }

    pub fn bounds_on(&self, date: NaiveDate) -> BreakBounds {
        let window_start = date.and_time(self.start);
        BreakBounds {
            window_start,
            window_end: advance(window_start, minutes(self.window_minutes)),
            duration: minutes(self.duration_minutes),
        }
    }
}

impl Default for PrayerBreak {
    fn default() -> Self {
        Self {
            start: hm(13, 0),
            duration_minutes: 20,
            window_minutes: 120,
        }
    }
}

/// A break window resolved onto a concrete calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakBounds {
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub duration: TimeDelta,
}

impl BreakBounds {
    /// Whether `[from, to)` intersects the break window.
    pub fn overlaps(&self, from: NaiveDateTime, to: NaiveDateTime) -> bool {
        from < self.window_end && to > self.window_start
    }

    /// The pause actually taken by a segment starting at `from`: it begins
    /// no earlier than the window opens and is clipped to the window end.
    pub fn clip(&self, from: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
        let start = from.max(self.window_start);
        let end = advance(start, self.duration).min(self.window_end);
        (start, end)
    }
}

pub(crate) fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

pub(crate) fn minutes(value: u32) -> TimeDelta {
    TimeDelta::minutes(i64::from(value))
}

/// Longest span a single leg, visit or tolerance may cover. Longer values
/// are capped so wall-clock arithmetic stays in range.
pub const MAX_SPAN_HOURS: f64 = 366.0 * 24.0;

/// Fractional hours to a millisecond-precision delta, capped at
/// [`MAX_SPAN_HOURS`].
pub fn hours(value: f64) -> TimeDelta {
    if !value.is_finite() || value <= 0.0 {
        return TimeDelta::zero();
    }
    TimeDelta::milliseconds((value.min(MAX_SPAN_HOURS) * 3_600_000.0).round() as i64)
}

pub fn seconds(value: f64) -> TimeDelta {
    if !value.is_finite() || value <= 0.0 {
        return TimeDelta::zero();
    }
    TimeDelta::milliseconds((value.min(MAX_SPAN_HOURS * 3600.0) * 1000.0).round() as i64)
}

/// `at + delta`, saturating at the end of the representable range.
pub fn advance(at: NaiveDateTime, delta: TimeDelta) -> NaiveDateTime {
    at.checked_add_signed(delta).unwrap_or(NaiveDateTime::MAX)
}

pub fn as_hours(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 3_600_000.0
}

/// Calendar date of mission day `day` (1-based).
pub fn date_of_day(start: NaiveDate, day: u32) -> NaiveDate {
    start
        .checked_add_days(Days::new(u64::from(day.saturating_sub(1))))
        .unwrap_or(NaiveDate::MAX)
}
