//! Collaborator seams.
//!
//! Road routing, AI estimation and geometric fallbacks all produce the same
//! thing: a travel matrix indexed like the site list. The planner core only
//! consumes that matrix and is agnostic to where it came from.

use crate::matrix::TravelMatrix;
use crate::site::Coordinate;

/// Provides a duration/distance matrix for a set of locations.
///
/// The matrix is indexed by the provided location order. Implementations
/// should return zero on the diagonal and non-negative values elsewhere;
/// entries they cannot determine may be left at zero, which the segment
/// builder and the scheduler treat as missing.
pub trait DistanceMatrixProvider {
    fn matrix_for(&self, locations: &[Coordinate]) -> TravelMatrix;
}

/// Estimates a single leg when a matrix entry is missing.
pub trait LegEstimator {
    /// Returns `(seconds, meters)` for travelling `from` → `to`.
    fn estimate(&self, from: Coordinate, to: Coordinate) -> (f64, f64);

    /// Travel seconds for a known road distance.
    fn seconds_for_meters(&self, meters: f64) -> f64;
}
