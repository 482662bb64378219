//! Route-ordering solver with a fixed start (index 0) and end (index N-1).
//!
//! Small instances are solved exactly by enumerating every ordering of the
//! interior sites; larger ones start from a nearest-neighbour tour. Both are
//! then passed through a 2-opt local search that keeps the endpoints fixed.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::order::Order;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    /// Largest matrix size solved by exhaustive enumeration.
    pub exact_threshold: usize,
    /// Maximum number of improving 2-opt moves applied.
    pub max_improvements: usize,
    /// Largest number of interior orderings the exact search may enumerate.
    /// Inputs above it use the heuristic even under `exact_threshold`.
    pub max_permutations: u64,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            exact_threshold: 10,
            max_improvements: 10_000,
            max_permutations: 40_320,
        }
    }
}

/// Compute the visiting order minimizing total travel duration.
///
/// The result always starts at `0` and ends at `N-1`. `N <= 2` returns the
/// identity order. Ties keep the first ordering found in lexicographic
/// enumeration order.
pub fn solve_order(durations: &[Vec<f64>], options: &SolveOptions) -> Order {
    let n = durations.len();
    if n <= 2 {
        return Order::identity(n);
    }

    let mut exact = n <= options.exact_threshold.max(3);
    if exact && !permutations_within(n - 2, options.max_permutations) {
        debug!(
            "{}! interior orderings exceed the budget of {}, using the heuristic",
            n - 2,
            options.max_permutations
        );
        exact = false;
    }

    let path = if exact {
        let path = exact_path(durations);
        debug!(
            "Exact search over {} interior sites, cost {:.0}s",
            n - 2,
            path_cost(&path, durations)
        );
        path
    } else {
        let path = nearest_neighbor_path(durations);
        debug!(
            "{} sites solved heuristically, nearest-neighbour cost {:.0}s",
            n,
            path_cost(&path, durations)
        );
        path
    };

    let path = two_opt(path, durations, options.max_improvements);
    Order::from_solver(path)
}

/// Sum of consecutive durations along `path`.
///
/// Missing or non-finite entries count as infinitely expensive.
pub fn path_cost(path: &[usize], durations: &[Vec<f64>]) -> f64 {
    path.windows(2).map(|pair| edge(durations, pair[0], pair[1])).sum()
}

fn edge(durations: &[Vec<f64>], from: usize, to: usize) -> f64 {
    durations
        .get(from)
        .and_then(|row| row.get(to))
        .copied()
        .filter(|value| !value.is_nan())
        .unwrap_or(f64::INFINITY)
}

/// Whether `interior!` is at most `budget`.
fn permutations_within(interior: usize, budget: u64) -> bool {
    let mut count: u64 = 1;
    for k in 2..=interior as u64 {
        count = count.saturating_mul(k);
        if count > budget {
            return false;
        }
    }
    count <= budget
}

fn exact_path(durations: &[Vec<f64>]) -> Vec<usize> {
    let n = durations.len();
    let mut path: Vec<usize> = (0..n).collect();
    let mut best = path.clone();
    let mut best_cost = path_cost(&path, durations);

    while next_permutation(&mut path[1..n - 1]) {
        let cost = path_cost(&path, durations);
        if cost < best_cost {
            best_cost = cost;
            best.copy_from_slice(&path);
        }
    }

    best
}

/// Advance `items` to the next lexicographic permutation. Returns false once
/// the last permutation has been reached.
fn next_permutation(items: &mut [usize]) -> bool {
    if items.len() < 2 {
        return false;
    }

    let Some(pivot) = (0..items.len() - 1).rev().find(|&i| items[i] < items[i + 1]) else {
        return false;
    };
    let successor = (pivot + 1..items.len())
        .rev()
        .find(|&j| items[j] > items[pivot])
        .unwrap_or(pivot + 1);

    items.swap(pivot, successor);
    items[pivot + 1..].reverse();
    true
}

fn nearest_neighbor_path(durations: &[Vec<f64>]) -> Vec<usize> {
    let n = durations.len();
    let mut unvisited: Vec<usize> = (1..n - 1).collect();
    let mut path = Vec::with_capacity(n);
    path.push(0);
    let mut current = 0;

    while !unvisited.is_empty() {
        // Strict comparison over ascending indices keeps the smallest index on ties.
        let mut nearest = 0;
        for (slot, &candidate) in unvisited.iter().enumerate() {
            if edge(durations, current, candidate) < edge(durations, current, unvisited[nearest]) {
                nearest = slot;
            }
        }
        current = unvisited.remove(nearest);
        path.push(current);
    }

    path.push(n - 1);
    path
}

/// 2-opt: Reverse an interior segment of the path to reduce travel time.
/// Returns true if an improvement was made.
fn two_opt_improve(path: &mut [usize], durations: &[Vec<f64>]) -> bool {
    let len = path.len();
    if len < 4 {
        return false;
    }

    let current_cost = path_cost(path, durations);
    let mut candidate = path.to_vec();

    for i in 1..len - 2 {
        for k in i + 1..len - 1 {
            candidate[i..=k].reverse();
            if path_cost(&candidate, durations) < current_cost {
                path.copy_from_slice(&candidate);
                return true;
            }
            candidate[i..=k].reverse();
        }
    }

    false
}

/// Run 2-opt until no more improvements or the move budget is spent.
fn two_opt(
    mut path: Vec<usize>,
    durations: &[Vec<f64>],
    max_improvements: usize,
) -> Vec<usize> {
    let mut improvements = 0;
    while improvements < max_improvements {
        if !two_opt_improve(&mut path, durations) {
            debug!("2-opt reached a local optimum after {} improvements", improvements);
            return path;
        }
        improvements += 1;
    }

    warn!(
        "2-opt stopped after {} improvements without reaching a local optimum",
        max_improvements
    );
    path
}
