pub mod data_generator;

pub use data_generator::{demo_request, haversine_problem, random_problem, random_request};
