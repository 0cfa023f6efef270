use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::problem::RoutingProblem;
use crate::domain::solution::Solution;
use crate::domain::types::{Coordinate, Location};

/// One resolved stop on a vehicle's route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    pub id: String,
    pub coordinate: Coordinate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub demand: u64,
}

impl From<&Location> for Stop {
    fn from(location: &Location) -> Self {
        Self {
            id: location.id.clone(),
            coordinate: location.coordinate,
            address: location.address.clone(),
            demand: location.demand,
        }
    }
}

/// Route of a single vehicle. `stops` begins and ends with the depot and
/// `legs[i]` is the distance from `stops[i]` to `stops[i + 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleRoute {
    pub vehicle: usize,
    pub capacity: u64,
    pub stops: Vec<Stop>,
    pub legs: Vec<u64>,
    pub distance: u64,
    pub load: u64,
}

impl VehicleRoute {
    /// True when the vehicle leaves the depot at all.
    pub fn is_used(&self) -> bool {
        self.stops.len() > 2
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub total_distance: u64,
    pub total_load: u64,
    pub routes: Vec<VehicleRoute>,
    pub feasible: bool,
    pub unserved: Vec<String>,
    /// False when the search stopped on its budget rather than at a local optimum.
    pub proven_local_optimum: bool,
}

impl RoutePlan {
    pub fn vehicles_used(&self) -> usize {
        self.routes.iter().filter(|r| r.is_used()).count()
    }
}

/// Resolve the index-based solution into named stops with per-leg distances.
pub fn report(problem: &RoutingProblem, solution: &Solution) -> RoutePlan {
    let dm = problem.distance_matrix();
    let locations = problem.locations();

    let routes: Vec<VehicleRoute> = solution
        .routes
        .iter()
        .enumerate()
        .map(|(vehicle, path)| {
            let legs: Vec<u64> = path.windows(2).map(|w| dm.get(w[0], w[1])).collect();
            VehicleRoute {
                vehicle,
                capacity: problem.fleet().capacity(vehicle),
                stops: path.iter().map(|&i| Stop::from(&locations[i])).collect(),
                distance: legs.iter().sum(),
                legs,
                load: path.iter().map(|&i| problem.demand(i)).sum(),
            }
        })
        .collect();

    RoutePlan {
        total_distance: routes.iter().map(|r| r.distance).sum(),
        total_load: routes.iter().map(|r| r.load).sum(),
        routes,
        feasible: solution.feasible,
        unserved: solution
            .unserved
            .iter()
            .map(|&i| locations[i].id.clone())
            .collect(),
        proven_local_optimum: !solution.stats.budget_exhausted,
    }
}

/// Log a plan the way the search loop reports its best solution.
pub fn log_plan(plan: &RoutePlan) {
    if plan.feasible {
        info!(
            "Distance: {} m, load: {}, vehicles used: {}/{}",
            plan.total_distance,
            plan.total_load,
            plan.vehicles_used(),
            plan.routes.len()
        );
    } else {
        warn!(
            "Distance: {} m, load: {}, unserved: {:?}",
            plan.total_distance, plan.total_load, plan.unserved
        );
    }

    for route in &plan.routes {
        let ids: Vec<&str> = route.stops.iter().map(|s| s.id.as_str()).collect();
        debug!(
            "Truck {}: {} / {} : {} m {:?}",
            route.vehicle + 1,
            route.load,
            route.capacity,
            route.distance,
            ids
        );
    }
}
