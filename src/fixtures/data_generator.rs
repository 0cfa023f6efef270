use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::distance::haversine::haversine_meters;
use crate::distance::matrix::DistanceMatrix;
use crate::domain::problem::RoutingProblem;
use crate::error::ValidationError;
use crate::setup::init_types::{BinInput, FleetInput, PlaceInput, RouteRequest};

pub const SEED: u64 = 42;

pub const DEPOT_LAT: f64 = 18.525003;
pub const DEPOT_LON: f64 = 73.855504;
pub const DEPOT_ADDRESS: &str =
    "GVG4+26C, Tophakhana, Shivajinagar, Pune, Maharashtra 411005, India";

pub const DEMO_VEHICLES: usize = 4;
pub const DEMO_CAPACITY: u64 = 100;

/// (id, lat, lon, address, fill level)
const DEMO_BINS: [(&str, f64, f64, &str, i64); 5] = [
    ("bin1", 18.5204, 73.8567, "MG Road, Pune", 75),
    ("bin2", 18.5314, 73.8446, "FC Road, Pune", 60),
    ("bin3", 18.5114, 73.8346, "JM Road, Pune", 85),
    ("bin4", 18.5167, 73.8562, "Shivaji Nagar, Pune", 70),
    ("bin5", 18.5289, 73.8744, "Koregaon Park, Pune", 90),
];

fn depot() -> PlaceInput {
    PlaceInput {
        lat: DEPOT_LAT,
        lon: DEPOT_LON,
        formatted_address: Some(DEPOT_ADDRESS.to_string()),
    }
}

/// Five bins around central Pune served from the Shivajinagar depot.
///
/// Every bin is more than half full, so four trucks of capacity 100 cannot
/// take all of them: the request plans with one bin unserved.
pub fn demo_request() -> RouteRequest {
    RouteRequest {
        depot: depot(),
        bins: DEMO_BINS
            .iter()
            .map(|&(id, lat, lon, address, fill_level)| BinInput {
                id: id.to_string(),
                location: PlaceInput {
                    lat,
                    lon,
                    formatted_address: Some(address.to_string()),
                },
                fill_level,
            })
            .collect(),
        fleet: FleetInput {
            vehicle_count: DEMO_VEHICLES,
            capacity: DEMO_CAPACITY,
        },
    }
}

/// Seeded request with `bins` bins scattered within ~5 km of the depot and
/// fill levels in 5..=60.
pub fn random_request(seed: u64, bins: usize, vehicles: usize, capacity: u64) -> RouteRequest {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let bins: Vec<BinInput> = (1..=bins)
        .map(|i| BinInput {
            id: format!("bin{}", i),
            location: PlaceInput {
                lat: DEPOT_LAT + rng.gen_range(-0.045..0.045),
                lon: DEPOT_LON + rng.gen_range(-0.045..0.045),
                formatted_address: None,
            },
            fill_level: rng.gen_range(5..=60),
        })
        .collect();

    let total_demand: i64 = bins.iter().map(|b| b.fill_level).sum();
    info!(
        "Generated {} bins, total demand {}, fleet capacity {}",
        bins.len(),
        total_demand,
        vehicles as u64 * capacity
    );

    RouteRequest {
        depot: depot(),
        bins,
        fleet: FleetInput {
            vehicle_count: vehicles,
            capacity,
        },
    }
}

/// [`random_request`] turned straight into a problem over a haversine matrix,
/// for tests that do not need the async builder.
pub fn random_problem(
    seed: u64,
    bins: usize,
    vehicles: usize,
    capacity: u64,
) -> Result<RoutingProblem, ValidationError> {
    haversine_problem(&random_request(seed, bins, vehicles, capacity))
}

/// Validate `request` and pair it with an exact haversine matrix.
pub fn haversine_problem(request: &RouteRequest) -> Result<RoutingProblem, ValidationError> {
    let locations = request.locations()?;
    let rows = locations
        .iter()
        .map(|a| {
            locations
                .iter()
                .map(|b| haversine_meters(a.coordinate, b.coordinate))
                .collect()
        })
        .collect();
    RoutingProblem::new(locations, request.fleet()?, DistanceMatrix::from_rows(rows)?)
}
