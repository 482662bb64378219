//! Haversine distance matrix provider (fallback when no routing service is
//! available).
//!
//! Uses great-circle distance, stretched by a detour factor, to estimate
//! road distance and travel time. Less accurate than a road network but
//! always available.

use rayon::prelude::*;

use crate::matrix::TravelMatrix;
use crate::site::Coordinate;
use crate::traits::{DistanceMatrixProvider, LegEstimator};

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 95.0;

/// Ratio of road distance to straight-line distance.
const DEFAULT_DETOUR_FACTOR: f64 = 1.2;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine-based distance matrix provider.
#[derive(Debug, Clone)]
pub struct HaversineMatrix {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
    /// Multiplier applied to great-circle distance.
    pub detour_factor: f64,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
            detour_factor: DEFAULT_DETOUR_FACTOR,
        }
    }
}

impl HaversineMatrix {
    pub fn new(speed_kmh: f64) -> Self {
        Self {
            speed_kmh,
            ..Self::default()
        }
    }

    /// Calculate haversine distance between two points in kilometers.
    pub fn haversine_km(from: Coordinate, to: Coordinate) -> f64 {
        let lat1_rad = from.lat.to_radians();
        let lat2_rad = to.lat.to_radians();
        let delta_lat = (to.lat - from.lat).to_radians();
        let delta_lng = (to.lon - from.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Estimated road distance in kilometers.
    pub fn road_km(&self, from: Coordinate, to: Coordinate) -> f64 {
        Self::haversine_km(from, to) * self.detour_factor
    }

    /// Convert distance in km to travel time in seconds.
    fn km_to_seconds(&self, km: f64) -> f64 {
        if self.speed_kmh <= 0.0 {
            return 0.0;
        }
        km / self.speed_kmh * 3600.0
    }
}

impl LegEstimator for HaversineMatrix {
    fn estimate(&self, from: Coordinate, to: Coordinate) -> (f64, f64) {
        let km = self.road_km(from, to);
        (self.km_to_seconds(km), km * 1000.0)
    }

    fn seconds_for_meters(&self, meters: f64) -> f64 {
        self.km_to_seconds(meters / 1000.0)
    }
}

impl DistanceMatrixProvider for HaversineMatrix {
    fn matrix_for(&self, locations: &[Coordinate]) -> TravelMatrix {
        let rows: Vec<(Vec<f64>, Vec<f64>)> = locations
            .par_iter()
            .enumerate()
            .map(|(i, from)| {
                let mut durations = vec![0.0; locations.len()];
                let mut distances = vec![0.0; locations.len()];
                for (j, to) in locations.iter().enumerate() {
                    if i != j {
                        let (secs, meters) = self.estimate(*from, *to);
                        durations[j] = secs;
                        distances[j] = meters;
                    }
                }
                (durations, distances)
            })
            .collect();

        let (durations, distances): (Vec<Vec<f64>>, Vec<Vec<f64>>) = rows.into_iter().unzip();
        TravelMatrix::new(durations, distances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAKAR: Coordinate = Coordinate::new(-17.4467, 14.6928);
    const SAINT_LOUIS: Coordinate = Coordinate::new(-16.4896, 16.0179);

    #[test]
    fn test_haversine_same_point() {
        let dist = HaversineMatrix::haversine_km(DAKAR, DAKAR);
        assert!(dist < 0.001, "Same point should have ~0 distance");
    }

    #[test]
    fn test_haversine_known_distance() {
        // Dakar to Saint-Louis is ~180 km as the crow flies
        let dist = HaversineMatrix::haversine_km(DAKAR, SAINT_LOUIS);
        assert!(
            dist > 170.0 && dist < 190.0,
            "Dakar to Saint-Louis should be ~180km, got {}",
            dist
        );
    }

    #[test]
    fn test_matrix_diagonal_is_zero() {
        let provider = HaversineMatrix::default();
        let locations = vec![DAKAR, SAINT_LOUIS, Coordinate::new(-16.9260, 14.7910)];
        let matrix = provider.matrix_for(&locations);

        assert_eq!(matrix.len(), 3);
        for i in 0..locations.len() {
            assert_eq!(matrix.duration(i, i), 0.0, "Diagonal should be zero");
            assert_eq!(matrix.distance(i, i), 0.0, "Diagonal should be zero");
        }
    }

    #[test]
    fn test_matrix_symmetric() {
        let provider = HaversineMatrix::default();
        let matrix = provider.matrix_for(&[DAKAR, SAINT_LOUIS]);

        assert_eq!(matrix.duration(0, 1), matrix.duration(1, 0), "Matrix should be symmetric");
    }

    #[test]
    fn test_detour_and_speed() {
        let provider = HaversineMatrix::default();
        // 95 km of road at 95 km/h is one hour
        assert!((provider.seconds_for_meters(95_000.0) - 3600.0).abs() < 1e-6);

        let (secs, meters) = provider.estimate(DAKAR, SAINT_LOUIS);
        let straight = HaversineMatrix::haversine_km(DAKAR, SAINT_LOUIS) * 1000.0;
        assert!((meters - straight * 1.2).abs() < 1e-6);
        assert!((secs - meters / 1000.0 / 95.0 * 3600.0).abs() < 1e-6);
    }
}
