//! Travel matrices and the legs (segments) read from them along an order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::order::Order;
use crate::site::Coordinate;
use crate::traits::LegEstimator;

/// Square duration (seconds) and distance (meters) tables indexed like the
/// site list. Need not be symmetric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TravelMatrix {
    durations: Vec<Vec<f64>>,
    distances: Vec<Vec<f64>>,
}

impl TravelMatrix {
    pub fn new(durations: Vec<Vec<f64>>, distances: Vec<Vec<f64>>) -> Self {
        Self {
            durations,
            distances,
        }
    }

    /// A matrix with durations only; every distance is missing.
    pub fn from_durations(durations: Vec<Vec<f64>>) -> Self {
        let distances = durations.iter().map(|row| vec![0.0; row.len()]).collect();
        Self::new(durations, distances)
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    pub fn durations(&self) -> &[Vec<f64>] {
        &self.durations
    }

    pub fn distances(&self) -> &[Vec<f64>] {
        &self.distances
    }

    /// Both tables are `n × n` for the same `n`.
    pub fn is_square(&self) -> bool {
        let n = self.durations.len();
        self.distances.len() == n
            && self.durations.iter().all(|row| row.len() == n)
            && self.distances.iter().all(|row| row.len() == n)
    }

    /// Travel seconds `from → to`; absent entries read as zero.
    pub fn duration(&self, from: usize, to: usize) -> f64 {
        lookup(&self.durations, from, to)
    }

    /// Travel meters `from → to`; absent entries read as zero.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        lookup(&self.distances, from, to)
    }
}

fn lookup(table: &[Vec<f64>], from: usize, to: usize) -> f64 {
    table
        .get(from)
        .and_then(|row| row.get(to))
        .copied()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Where a segment's figures came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentSource {
    Matrix,
    /// At least one figure was recomputed from coordinates.
    Geometric,
}

/// One travel leg between two consecutive sites of an order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: usize,
    pub to: usize,
    pub duration_secs: f64,
    pub distance_m: f64,
    pub source: SegmentSource,
}

/// Read the legs of `order` from `matrix`.
///
/// When a leg has a non-positive duration or distance and coordinates are
/// known for both ends, the missing figure is recomputed with `estimator`:
/// distance from the coordinates, duration from the matrix distance if that
/// is positive and from the estimated distance otherwise. Figures that stay
/// non-positive are left for the scheduler's fallback.
pub fn segments_along<E: LegEstimator>(
    order: &Order,
    matrix: &TravelMatrix,
    coords: &[Coordinate],
    estimator: Option<&E>,
) -> Vec<Segment> {
    order
        .as_slice()
        .windows(2)
        .enumerate()
        .map(|(leg, pair)| {
            let (from, to) = (pair[0], pair[1]);
            let mut segment = Segment {
                from,
                to,
                duration_secs: matrix.duration(from, to),
                distance_m: matrix.distance(from, to),
                source: SegmentSource::Matrix,
            };

            let missing = segment.duration_secs <= 0.0 || segment.distance_m <= 0.0;
            if let (true, Some(estimator), Some(a), Some(b)) =
                (missing, estimator, coords.get(from), coords.get(to))
            {
                let (geo_secs, geo_meters) = estimator.estimate(*a, *b);
                if segment.distance_m <= 0.0 {
                    segment.distance_m = geo_meters;
                }
                if segment.duration_secs <= 0.0 {
                    segment.duration_secs =
                        estimator.seconds_for_meters(segment.distance_m.max(0.0));
                    if segment.duration_secs <= 0.0 {
                        segment.duration_secs = geo_secs;
                    }
                }
                segment.source = SegmentSource::Geometric;
                debug!(
                    "Leg {} ({} -> {}) recomputed geometrically: {:.1} km, {:.2} h",
                    leg,
                    from,
                    to,
                    segment.distance_m / 1000.0,
                    segment.duration_secs / 3600.0
                );
            }

            segment
        })
        .collect()
}
