use std::time::Duration;

use crate::domain::problem::RoutingProblem;

/// Counters collected while solving one problem.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveStats {
    pub construction_objective: u64,
    pub sweeps: usize,
    pub two_opt_moves: usize,
    pub relocate_moves: usize,
    pub swap_moves: usize,
    /// Bins left unserved by construction that fit after local search.
    pub reinserted: usize,
    /// True when the sweep or time budget stopped the search before it converged.
    pub budget_exhausted: bool,
    pub elapsed: Duration,
    /// `(sweep, objective)` each time the objective improved.
    pub history: Vec<(usize, u64)>,
}

impl SolveStats {
    pub fn moves_applied(&self) -> usize {
        self.two_opt_moves + self.relocate_moves + self.swap_moves
    }
}

/// Result of one solve call.
///
/// Each route starts and ends at the depot (index 0); a vehicle that serves
/// nothing has the route `[0, 0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub routes: Vec<Vec<usize>>,
    pub feasible: bool,
    pub objective: u64,
    pub unserved: Vec<usize>,
    pub stats: SolveStats,
}

impl Solution {
    pub fn route_load(&self, problem: &RoutingProblem, vehicle: usize) -> u64 {
        self.routes[vehicle]
            .iter()
            .map(|&index| problem.demand(index))
            .sum()
    }

    pub fn route_distance(&self, problem: &RoutingProblem, vehicle: usize) -> u64 {
        problem.distance_matrix().path_distance(&self.routes[vehicle])
    }

    /// Bin indices visited by `vehicle`, without the depot endpoints.
    pub fn stops(&self, vehicle: usize) -> &[usize] {
        let route = &self.routes[vehicle];
        &route[1..route.len() - 1]
    }

    pub fn served_count(&self) -> usize {
        (0..self.routes.len()).map(|v| self.stops(v).len()).sum()
    }
}
