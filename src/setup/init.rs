use tracing::{debug, info, span, Instrument, Level};

use crate::config::PlannerConfig;
use crate::distance::builder::{DistanceMatrixBuilder, MatrixStats};
use crate::distance::provider::DistanceProvider;
use crate::distance::providers::lookup_for;
use crate::domain::problem::RoutingProblem;
use crate::domain::solution::Solution;
use crate::error::PlanError;
use crate::report::plan::{report, RoutePlan};
use crate::setup::init_types::RouteRequest;
use crate::solver::CvrpSolver;

/// Everything produced while planning one request.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub problem: RoutingProblem,
    pub solution: Solution,
    pub matrix_stats: MatrixStats,
    pub plan: RoutePlan,
}

/// Request boundary: validates input, builds the matrix, solves and reports.
#[derive(Clone)]
pub struct RoutePlanner {
    builder: DistanceMatrixBuilder,
    solver: CvrpSolver,
}

impl RoutePlanner {
    pub fn new(builder: DistanceMatrixBuilder, solver: CvrpSolver) -> Self {
        Self { builder, solver }
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        let provider =
            DistanceProvider::new(lookup_for(&config.provider)).with_timeout(config.lookup_timeout);
        Self::new(
            DistanceMatrixBuilder::new(provider),
            CvrpSolver::new(config.budget),
        )
    }

    pub async fn plan(&self, request: &RouteRequest) -> Result<RoutePlan, PlanError> {
        Ok(self.plan_detailed(request).await?.plan)
    }

    /// Like [`plan`](Self::plan) but keeps the intermediate problem, solution and
    /// matrix diagnostics.
    pub async fn plan_detailed(&self, request: &RouteRequest) -> Result<PlanOutcome, PlanError> {
        let locations = request.locations()?;
        let fleet = request.fleet()?;
        info!(
            "Planning {} bins for {} vehicles of capacity {}",
            request.bins.len(),
            request.fleet.vehicle_count,
            request.fleet.capacity
        );

        let coords: Vec<_> = locations.iter().map(|l| l.coordinate).collect();
        let (matrix, matrix_stats) = self
            .builder
            .build(&coords)
            .instrument(span!(Level::INFO, "build_matrix", locations = coords.len()))
            .await;
        debug!("Matrix stats: {:?}", matrix_stats);

        let problem = RoutingProblem::new(locations, fleet, matrix)?;

        let solution = self.solver.solve(&problem);
        let plan = report(&problem, &solution);

        Ok(PlanOutcome {
            problem,
            solution,
            matrix_stats,
            plan,
        })
    }
}
