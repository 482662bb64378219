//! Scheduling configuration.
//!
//! Everything the scheduler needs to know about the working day is carried
//! in [`ScheduleOptions`] and passed explicitly to
//! [`crate::scheduler::schedule`]. Missing fields in a serialized document
//! fall back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::window::{LunchBreak, PrayerBreak, TimeWindow, hm};

/// What happens to a visit that overruns the activity window on a site
/// whose `can_extend` flag is not set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrunPolicy {
    /// End the visit at the activity-window end and drop the remainder.
    #[default]
    Clamp,
    /// Split the visit and resume the remainder on the next day.
    Continue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleOptions {
    /// Daily range during which visits may happen.
    pub activity: TimeWindow,
    /// Daily range during which travel may happen.
    pub travel: TimeWindow,
    pub lunch: Option<LunchBreak>,
    pub prayer: Option<PrayerBreak>,
    /// How far past the activity-window end an extendable visit may run
    /// without being split.
    pub tolerance_hours: f64,
    /// Close the day early when less than this remains before the
    /// travel-window end.
    pub early_close_hours: f64,
    /// Substituted for a leg whose duration is missing.
    pub fallback_travel_secs: f64,
    /// Substituted for a leg whose distance is missing.
    pub fallback_distance_km: f64,
    /// Warn when the itinerary needs more days than this.
    pub max_days: Option<u32>,
    pub non_extendable_overrun: OverrunPolicy,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            activity: TimeWindow {
                start: hm(8, 0),
                end: hm(16, 30),
            },
            travel: TimeWindow {
                start: hm(7, 30),
                end: hm(19, 0),
            },
            lunch: Some(LunchBreak::default()),
            prayer: None,
            tolerance_hours: 1.0,
            early_close_hours: 1.5,
            fallback_travel_secs: 3600.0,
            fallback_distance_km: 50.0,
            max_days: None,
            non_extendable_overrun: OverrunPolicy::Clamp,
        }
    }
}

impl ScheduleOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.activity
            .validate()
            .map_err(|source| ConfigError::Window { name: "activity", source })?;
        self.travel
            .validate()
            .map_err(|source| ConfigError::Window { name: "travel", source })?;
        if let Some(lunch) = &self.lunch {
            lunch
                .validate()
                .map_err(|source| ConfigError::Window { name: "lunch", source })?;
        }
        if let Some(prayer) = &self.prayer {
            prayer
                .validate()
                .map_err(|source| ConfigError::Window { name: "prayer", source })?;
        }

        for (name, value) in [
            ("tolerance_hours", self.tolerance_hours),
            ("early_close_hours", self.early_close_hours),
            ("fallback_travel_secs", self.fallback_travel_secs),
            ("fallback_distance_km", self.fallback_distance_km),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { name, value });
            }
        }
        Ok(())
    }
}
