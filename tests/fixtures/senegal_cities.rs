//! Senegalese cities used as mission sites in realistic tests.
//!
//! Coordinates are city centres as (longitude, latitude).

use mission_planner::site::{Coordinate, Site};

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct City {
    pub name: &'static str,
    pub lon: f64,
    pub lat: f64,
}

impl City {
    pub const fn new(name: &'static str, lon: f64, lat: f64) -> Self {
        Self { name, lon, lat }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lon, self.lat)
    }

    pub fn site(&self, category: &str, hours: f64) -> Site {
        Site::new(self.name).category(category).duration_hours(hours)
    }
}

pub const DAKAR: City = City::new("Dakar", -17.4467, 14.6928);

pub const CITIES: &[City] = &[
    City::new("Thiès", -16.9260, 14.7910),
    City::new("Mbour", -16.9667, 14.4167),
    City::new("Kaolack", -16.0726, 14.1520),
    City::new("Saint-Louis", -16.4896, 16.0179),
    City::new("Touba", -15.8833, 14.8667),
    City::new("Diourbel", -16.2333, 14.6500),
    City::new("Louga", -16.2244, 15.6142),
    City::new("Fatick", -16.4111, 14.3390),
    City::new("Kaffrine", -15.5500, 14.1059),
    City::new("Tambacounda", -13.6673, 13.7707),
    City::new("Ziguinchor", -16.2719, 12.5833),
    City::new("Kolda", -14.9500, 12.8833),
    City::new("Matam", -13.2554, 15.6559),
    City::new("Kédougou", -12.1747, 12.5605),
];
