use crate::distance::matrix::DistanceMatrix;
use crate::domain::problem::RoutingProblem;

/// Length of `depot -> stops[0] -> ... -> stops[n-1] -> depot`.
pub fn route_distance(stops: &[usize], dm: &DistanceMatrix) -> u64 {
    let (Some(&first), Some(&last)) = (stops.first(), stops.last()) else {
        return 0;
    };

    let warehouse_to_first_loc = dist_between(0, first, dm);
    let last_loc_to_warehouse = dist_between(last, 0, dm);
    let between: u64 = stops
        .windows(2)
        .map(|leg| dist_between(leg[0], leg[1], dm))
        .sum();

    warehouse_to_first_loc + between + last_loc_to_warehouse
}

pub fn total_distance(routes: &[Vec<usize>], dm: &DistanceMatrix) -> u64 {
    routes.iter().map(|stops| route_distance(stops, dm)).sum()
}

pub fn route_load(stops: &[usize], problem: &RoutingProblem) -> u64 {
    stops.iter().map(|&index| problem.demand(index)).sum()
}

#[inline]
pub fn dist_between(from_loc: usize, to_loc: usize, dm: &DistanceMatrix) -> u64 {
    dm.get(from_loc, to_loc)
}

/// Signed distance so move deltas can go negative.
#[inline]
pub(crate) fn d(dm: &DistanceMatrix, from: usize, to: usize) -> i64 {
    dm.get(from, to) as i64
}
