pub mod plan;

pub use plan::{log_plan, report, RoutePlan, Stop, VehicleRoute};
