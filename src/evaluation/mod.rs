pub mod fitness;

pub use fitness::{route_distance, route_load, total_distance};
