pub mod init;
pub mod init_types;

pub use init::{PlanOutcome, RoutePlanner};
pub use init_types::{BinInput, FleetInput, PlaceInput, RouteRequest};
