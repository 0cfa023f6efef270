use std::time::Instant;

use tracing::{debug, info, span, trace, Level};

use crate::config::SolverBudget;
use crate::domain::problem::RoutingProblem;
use crate::domain::solution::SolveStats;
use crate::evaluation::fitness::total_distance;

use super::neighbourhood::{apply, best_move, Move, RouteSet};

/// Best-improvement descent. Each sweep scans the full neighbourhood and applies
/// the best strictly improving move; the search stops at a local optimum or
/// when the budget runs out. Since only improving moves are applied, the
/// current routes are always the best seen.
pub(crate) fn improve(
    problem: &RoutingProblem,
    set: &mut RouteSet,
    budget: &SolverBudget,
    stats: &mut SolveStats,
    started: Instant,
) -> u64 {
    let search_span = span!(Level::DEBUG, "local_search", max_sweeps = budget.max_sweeps);
    let _guard = search_span.enter();

    let dm = problem.distance_matrix();
    let mut objective = total_distance(&set.routes, dm);

    loop {
        let Some(candidate) = best_move(problem, set) else {
            debug!("Local optimum after {} sweeps: {}", stats.sweeps, objective);
            break;
        };

        let out_of_sweeps = stats.sweeps >= budget.max_sweeps;
        let out_of_time = budget
            .time_limit
            .is_some_and(|limit| started.elapsed() >= limit);
        if out_of_sweeps || out_of_time {
            info!(
                "Search budget exhausted after {} sweeps (time limit hit: {}), keeping {}",
                stats.sweeps, out_of_time, objective
            );
            stats.budget_exhausted = true;
            break;
        }

        apply(problem, set, candidate.mv);
        objective = (objective as i64 + candidate.delta) as u64;
        stats.sweeps += 1;
        match candidate.mv {
            Move::TwoOpt { .. } => stats.two_opt_moves += 1,
            Move::Relocate { .. } => stats.relocate_moves += 1,
            Move::Swap { .. } => stats.swap_moves += 1,
        }
        stats.history.push((stats.sweeps, objective));
        trace!(
            "Sweep {}: {:?} delta {} -> {}",
            stats.sweeps,
            candidate.mv,
            candidate.delta,
            objective
        );
        debug_assert_eq!(objective, total_distance(&set.routes, dm));
    }

    objective
}
