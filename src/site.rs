//! Visiting stops and the base location that brackets a mission.

use serde::{Deserialize, Serialize};

/// Category given to the synthetic departure/return sites.
pub const BASE_CATEGORY: &str = "Base";

/// A (longitude, latitude) pair, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// A visiting stop.
///
/// `name` is a display key and need not be unique. A `duration_hours` of zero
/// makes the site a pure waypoint: it is travelled through but no visit is
/// scheduled there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    pub category: String,
    pub activity: String,
    pub duration_hours: f64,
    /// Allow the visit to overrun the activity window instead of being
    /// clamped to it.
    #[serde(default)]
    pub can_extend: bool,
}

impl Site {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: "Site".to_string(),
            activity: "Visit".to_string(),
            duration_hours: 0.0,
            can_extend: false,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn activity(mut self, activity: impl Into<String>) -> Self {
        self.activity = activity.into();
        self
    }

    pub fn duration_hours(mut self, hours: f64) -> Self {
        self.duration_hours = hours;
        self
    }

    pub fn can_extend(mut self, can_extend: bool) -> Self {
        self.can_extend = can_extend;
        self
    }

    pub fn is_base(&self) -> bool {
        self.category == BASE_CATEGORY
    }

    /// Planned visit duration, with negative or non-finite values read as zero.
    pub fn planned_hours(&self) -> f64 {
        if self.duration_hours.is_finite() && self.duration_hours > 0.0 {
            self.duration_hours
        } else {
            0.0
        }
    }

    /// Label used for the visit events of this site.
    pub fn visit_label(&self) -> String {
        let name = self.name.to_uppercase();
        if self.is_base() {
            format!("{name} – {}", self.activity)
        } else {
            format!("{name} – Visit {}", self.category)
        }
    }
}

/// Wrap `sites` between a departure and a return instance of the base, so
/// that the base occupies the fixed endpoints `0` and `N-1`.
///
/// Coordinates stay parallel to sites.
pub fn bracket_with_base(
    base_name: &str,
    base_coord: Coordinate,
    sites: Vec<Site>,
    coords: Vec<Coordinate>,
) -> (Vec<Site>, Vec<Coordinate>) {
    let departure = Site::new(base_name)
        .category(BASE_CATEGORY)
        .activity("Departure");
    let arrival = Site::new(base_name)
        .category(BASE_CATEGORY)
        .activity("Return");

    let mut all_sites = Vec::with_capacity(sites.len() + 2);
    all_sites.push(departure);
    all_sites.extend(sites);
    all_sites.push(arrival);

    let mut all_coords = Vec::with_capacity(coords.len() + 2);
    all_coords.push(base_coord);
    all_coords.extend(coords);
    all_coords.push(base_coord);

    (all_sites, all_coords)
}
