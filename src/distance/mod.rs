pub mod builder;
pub mod haversine;
pub mod lookup;
pub mod matrix;
pub mod provider;
pub mod providers;

pub use builder::{DistanceMatrixBuilder, MatrixStats};
pub use haversine::haversine_meters;
pub use lookup::{DistanceLookup, Element};
pub use matrix::DistanceMatrix;
pub use provider::DistanceProvider;
