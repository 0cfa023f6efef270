pub mod problem;
pub mod solution;
pub mod types;

pub use problem::RoutingProblem;
pub use solution::{SolveStats, Solution};
pub use types::{Coordinate, Fleet, Location, Vehicle};
