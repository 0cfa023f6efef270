pub mod app;
pub mod config;
pub mod distance;
pub mod domain;
pub mod error;
pub mod evaluation;
pub mod fixtures;
pub mod report;
pub mod setup;
pub mod solver;

pub use config::{PlannerConfig, ProviderKind, SolverBudget};
pub use distance::{DistanceMatrix, DistanceMatrixBuilder, DistanceProvider, MatrixStats};
pub use domain::{Coordinate, Fleet, Location, RoutingProblem, SolveStats, Solution, Vehicle};
pub use error::{ConfigError, PlanError, ProviderError, ValidationError};
pub use report::{RoutePlan, VehicleRoute};
pub use setup::{RoutePlanner, RouteRequest};
pub use solver::CvrpSolver;
