pub(crate) mod construction;
pub(crate) mod local_search;

use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, span, warn, Level};

use crate::config::SolverBudget;
use crate::domain::problem::RoutingProblem;
use crate::domain::solution::{SolveStats, Solution};

use construction::{construct, reinsert};
use local_search::{improve, RouteSet};

/// Capacitated vehicle routing solver: cheapest-insertion construction followed
/// by best-improvement local search (2-opt, segment relocate, swap).
///
/// The solver holds only its budget; every call owns its working state, so one
/// instance can serve concurrent solves.
#[derive(Debug, Clone, Default)]
pub struct CvrpSolver {
    budget: SolverBudget,
}

impl CvrpSolver {
    pub fn new(budget: SolverBudget) -> Self {
        Self { budget }
    }

    pub fn solve(&self, problem: &RoutingProblem) -> Solution {
        let started = Instant::now();
        let solve_span = span!(
            Level::INFO,
            "solve",
            bins = problem.bins().len(),
            vehicles = problem.fleet().len()
        );
        let _guard = solve_span.enter();

        let total_demand = problem.total_demand();
        let total_capacity = problem.fleet().total_capacity();
        if total_demand > total_capacity {
            warn!(
                "Total demand {} exceeds fleet capacity {}, some bins will be unserved",
                total_demand, total_capacity
            );
        }

        let initial = construct(problem);
        let mut stats = SolveStats {
            construction_objective: initial.distance(problem),
            ..SolveStats::default()
        };
        let mut unserved = initial.unserved;
        let mut set = RouteSet {
            routes: initial.routes,
            loads: initial.loads,
        };

        // retry stranded bins after each descent until none fits
        let mut objective = improve(problem, &mut set, &self.budget, &mut stats, started);
        loop {
            let placed = reinsert(problem, &mut set.routes, &mut set.loads, &mut unserved);
            if placed == 0 {
                break;
            }
            stats.reinserted += placed;
            info!(
                "Reinserted {} stranded bins after {} sweeps, {} still unserved",
                placed,
                stats.sweeps,
                unserved.len()
            );
            stats.budget_exhausted = false;
            objective = improve(problem, &mut set, &self.budget, &mut stats, started);
        }
        stats.elapsed = started.elapsed();

        let routes = set
            .routes
            .into_iter()
            .map(|stops| {
                let mut route = Vec::with_capacity(stops.len() + 2);
                route.push(0);
                route.extend(stops);
                route.push(0);
                route
            })
            .collect();

        info!(
            "Solved: distance {} (construction {}), {} sweeps, {} unserved, {:?}",
            objective,
            stats.construction_objective,
            stats.sweeps,
            unserved.len(),
            stats.elapsed
        );

        Solution {
            routes,
            feasible: unserved.is_empty(),
            objective,
            unserved,
            stats,
        }
    }

    /// Solve independent problems in parallel.
    pub fn solve_all(&self, problems: &[RoutingProblem]) -> Vec<Solution> {
        problems.par_iter().map(|problem| self.solve(problem)).collect()
    }
}
