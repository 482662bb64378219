//! Visiting orders: solver output and manual overrides share one type.

use serde::{Deserialize, Serialize};

use crate::error::OrderError;

/// A permutation of site positions.
///
/// With pinned endpoints the order starts at `0` and ends at `n - 1`, and
/// manual moves never displace those two positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    indices: Vec<usize>,
    pinned: bool,
}

impl Order {
    /// `0, 1, .., n-1` with pinned endpoints.
    pub fn identity(n: usize) -> Self {
        Self {
            indices: (0..n).collect(),
            pinned: true,
        }
    }

    /// Validate a manual order over `indices.len()` sites.
    pub fn from_indices(indices: Vec<usize>, pinned: bool) -> Result<Self, OrderError> {
        let len = indices.len();
        let mut seen = vec![false; len];
        for &index in &indices {
            if index >= len {
                return Err(OrderError::OutOfRange { index, len });
            }
            if seen[index] {
                return Err(OrderError::Duplicate(index));
            }
            seen[index] = true;
        }

        if pinned && len >= 2 && (indices[0] != 0 || indices[len - 1] != len - 1) {
            return Err(OrderError::EndpointsMoved { last: len - 1 });
        }

        Ok(Self { indices, pinned })
    }

    /// Manual order around a fixed base: `[0] + interior + [n-1]`, where
    /// `interior` lists the visited sites as 0-based positions among the
    /// `n - 2` non-base sites.
    pub fn with_base(interior: &[usize]) -> Result<Self, OrderError> {
        let last = interior.len() + 1;
        let mut indices = Vec::with_capacity(interior.len() + 2);
        indices.push(0);
        indices.extend(interior.iter().map(|index| index + 1));
        indices.push(last);
        Self::from_indices(indices, true)
    }

    /// Solver output; callers inside the crate guarantee the invariants.
    pub(crate) fn from_solver(indices: Vec<usize>) -> Self {
        Self {
            indices,
            pinned: true,
        }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    pub fn into_inner(self) -> Vec<usize> {
        self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned
    }

    fn movable(&self, position: usize) -> bool {
        let len = self.indices.len();
        position < len && !(self.pinned && (position == 0 || position == len - 1))
    }

    /// Swap the site at `position` with the one before it.
    pub fn move_up(&mut self, position: usize) -> Result<(), OrderError> {
        if position == 0 || !self.movable(position) || !self.movable(position - 1) {
            return Err(OrderError::Immovable { position });
        }
        self.indices.swap(position, position - 1);
        Ok(())
    }

    /// Swap the site at `position` with the one after it.
    pub fn move_down(&mut self, position: usize) -> Result<(), OrderError> {
        if !self.movable(position) || !self.movable(position + 1) {
            return Err(OrderError::Immovable { position });
        }
        self.indices.swap(position, position + 1);
        Ok(())
    }

    /// Total chained duration of this order over `durations`.
    pub fn path_cost(&self, durations: &[Vec<f64>]) -> f64 {
        crate::solver::path_cost(&self.indices, durations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_permutations() {
        assert_eq!(
            Order::from_indices(vec![0, 3, 1], false),
            Err(OrderError::OutOfRange { index: 3, len: 3 })
        );
        assert_eq!(Order::from_indices(vec![0, 1, 1], false), Err(OrderError::Duplicate(1)));
    }

    #[test]
    fn test_pinned_endpoints_enforced() {
        assert_eq!(
            Order::from_indices(vec![1, 0, 2], true),
            Err(OrderError::EndpointsMoved { last: 2 })
        );
        assert!(Order::from_indices(vec![1, 0, 2], false).is_ok());
    }

    #[test]
    fn test_with_base_shifts_interior() {
        let order = Order::with_base(&[2, 0, 1]).unwrap();
        assert_eq!(order.as_slice(), &[0, 3, 1, 2, 4]);
    }

    #[test]
    fn test_moves_keep_endpoints() {
        let mut order = Order::identity(5);
        order.move_down(1).unwrap();
        assert_eq!(order.as_slice(), &[0, 2, 1, 3, 4]);

        assert!(order.move_up(1).is_err(), "cannot swap with the fixed start");
        assert!(order.move_down(3).is_err(), "cannot swap with the fixed end");
        assert!(order.move_down(9).is_err());

        order.move_up(2).unwrap();
        assert_eq!(order, Order::identity(5), "move then revert is a no-op");
    }
}
