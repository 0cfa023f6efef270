use std::cmp::Reverse;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::problem::RoutingProblem;
use crate::evaluation::fitness::{d, total_distance};

/// Routes (stops only, no depot) and loads built by a construction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Construction {
    pub routes: Vec<Vec<usize>>,
    pub loads: Vec<u64>,
    pub unserved: Vec<usize>,
}

impl Construction {
    fn empty(problem: &RoutingProblem) -> Self {
        let vehicles = problem.fleet().len();
        Self {
            routes: vec![Vec::new(); vehicles],
            loads: vec![0; vehicles],
            unserved: Vec::new(),
        }
    }

    fn insert(&mut self, problem: &RoutingProblem, location: usize, at: Insertion) {
        self.routes[at.vehicle].insert(at.position, location);
        self.loads[at.vehicle] += problem.demand(location);
    }

    pub fn distance(&self, problem: &RoutingProblem) -> u64 {
        total_distance(&self.routes, problem.distance_matrix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Insertion {
    pub delta: i64,
    pub vehicle: usize,
    pub position: usize,
}

impl Insertion {
    fn key(&self) -> (i64, usize, usize) {
        (self.delta, self.vehicle, self.position)
    }
}

/// Cheapest capacity-feasible place for `location`, ties going to the lowest
/// vehicle and then the lowest position.
pub(crate) fn best_insertion(
    problem: &RoutingProblem,
    routes: &[Vec<usize>],
    loads: &[u64],
    location: usize,
) -> Option<Insertion> {
    let dm = problem.distance_matrix();
    let demand = problem.demand(location);
    let mut best: Option<Insertion> = None;

    for (vehicle, stops) in routes.iter().enumerate() {
        if loads[vehicle].saturating_add(demand) > problem.fleet().capacity(vehicle) {
            continue;
        }
        for position in 0..=stops.len() {
            let prev = if position == 0 { 0 } else { stops[position - 1] };
            let next = if position == stops.len() { 0 } else { stops[position] };
            let delta = d(dm, prev, location) + d(dm, location, next) - d(dm, prev, next);
            let candidate = Insertion {
                delta,
                vehicle,
                position,
            };
            if best.map_or(true, |b| candidate.key() < b.key()) {
                best = Some(candidate);
            }
        }
    }
    best
}

/// Global cheapest insertion: every round inserts the unrouted location whose
/// best insertion is cheapest overall.
pub(crate) fn cheapest_insertion(problem: &RoutingProblem) -> Construction {
    let mut construction = Construction::empty(problem);
    let mut unrouted: Vec<usize> = (1..problem.locations().len()).collect();

    while !unrouted.is_empty() {
        let chosen = unrouted
            .par_iter()
            .enumerate()
            .filter_map(|(slot, &location)| {
                best_insertion(problem, &construction.routes, &construction.loads, location)
                    .map(|insertion| (insertion, location, slot))
            })
            .min_by_key(|(insertion, location, _)| {
                (insertion.delta, insertion.vehicle, insertion.position, *location)
            });

        let Some((insertion, location, slot)) = chosen else {
            break;
        };
        construction.insert(problem, location, insertion);
        unrouted.remove(slot);
    }

    construction.unserved = unrouted;
    construction
}

/// Largest demand first, each at its cheapest feasible position. Packs the
/// fleet tighter than [`cheapest_insertion`] when capacity is scarce.
pub(crate) fn demand_first_insertion(problem: &RoutingProblem) -> Construction {
    let mut construction = Construction::empty(problem);
    let mut order: Vec<usize> = (1..problem.locations().len()).collect();
    order.sort_by_key(|&location| (Reverse(problem.demand(location)), location));

    for location in order {
        match best_insertion(problem, &construction.routes, &construction.loads, location) {
            Some(insertion) => construction.insert(problem, location, insertion),
            None => construction.unserved.push(location),
        }
    }

    construction.unserved.sort_unstable();
    construction
}

/// Insert every unserved location that now fits somewhere, in index order,
/// each at its cheapest position. Returns how many were placed.
pub(crate) fn reinsert(
    problem: &RoutingProblem,
    routes: &mut [Vec<usize>],
    loads: &mut [u64],
    unserved: &mut Vec<usize>,
) -> usize {
    let before = unserved.len();
    unserved.retain(|&location| match best_insertion(problem, routes, loads, location) {
        Some(at) => {
            routes[at.vehicle].insert(at.position, location);
            loads[at.vehicle] += problem.demand(location);
            false
        }
        None => true,
    });
    before - unserved.len()
}

/// Initial solution. Falls back to demand-first packing when the greedy pass
/// leaves demand unserved, and keeps whichever serves more locations (then the
/// shorter one).
pub(crate) fn construct(problem: &RoutingProblem) -> Construction {
    let greedy = cheapest_insertion(problem);
    info!(
        "Cheapest insertion: distance {}, {} unserved",
        greedy.distance(problem),
        greedy.unserved.len()
    );
    if greedy.unserved.is_empty() {
        return greedy;
    }

    let packed = demand_first_insertion(problem);
    debug!(
        "Demand-first repair: distance {}, {} unserved",
        packed.distance(problem),
        packed.unserved.len()
    );

    let greedy_key = (greedy.unserved.len(), greedy.distance(problem));
    let packed_key = (packed.unserved.len(), packed.distance(problem));
    if packed_key < greedy_key {
        info!(
            "Demand-first repair kept: {} unserved instead of {}",
            packed.unserved.len(),
            greedy.unserved.len()
        );
        packed
    } else {
        greedy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::matrix::DistanceMatrix;
    use crate::domain::types::{Coordinate, Fleet, Location};

    fn problem(demands: &[u64], rows: Vec<Vec<u64>>, vehicles: usize, capacity: u64) -> RoutingProblem {
        let mut locations = vec![Location::depot("depot", Coordinate::new(0.0, 0.0))];
        for (i, &demand) in demands.iter().enumerate() {
            locations.push(Location::new(format!("bin{}", i + 1), Coordinate::new(0.0, 0.0), demand));
        }
        RoutingProblem::new(
            locations,
            Fleet::homogeneous(vehicles, capacity).unwrap(),
            DistanceMatrix::from_rows(rows).unwrap(),
        )
        .unwrap()
    }

    /// Points on a line: |i - j| * 10.
    fn line(n: usize) -> Vec<Vec<u64>> {
        (0..n)
            .map(|i| (0..n).map(|j| (i.abs_diff(j) as u64) * 10).collect())
            .collect()
    }

    #[test]
    fn inserts_nearest_first_and_respects_capacity() {
        let p = problem(&[60, 50], vec![vec![0, 10, 20], vec![10, 0, 15], vec![20, 15, 0]], 1, 100);
        let c = cheapest_insertion(&p);
        assert_eq!(c.routes, vec![vec![1]]);
        assert_eq!(c.loads, vec![60]);
        assert_eq!(c.unserved, vec![2]);
    }

    #[test]
    fn ties_go_to_lowest_vehicle_and_position() {
        let p = problem(&[1], line(2), 3, 10);
        let c = cheapest_insertion(&p);
        assert_eq!(c.routes, vec![vec![1], vec![], vec![]]);

        let at = best_insertion(&p, &[vec![], vec![]], &[0, 0], 1).unwrap();
        assert_eq!((at.vehicle, at.position), (0, 0));
    }

    #[test]
    fn chains_along_a_line() {
        let p = problem(&[1, 1, 1], line(4), 1, 10);
        let c = cheapest_insertion(&p);
        assert_eq!(c.routes[0].len(), 3);
        assert_eq!(c.distance(&p), 60);
        assert!(c.unserved.is_empty());
    }

    #[test]
    fn demand_first_packs_large_bins_before_small_ones() {
        // The two small bins sit next to the depot, so greedy spreads them over
        // two trucks and strands one of the large bins.
        let rows = vec![
            vec![0, 50, 50, 50, 1, 1],
            vec![50, 0, 50, 50, 50, 50],
            vec![50, 50, 0, 50, 50, 50],
            vec![50, 50, 50, 0, 50, 50],
            vec![1, 50, 50, 50, 0, 100],
            vec![1, 50, 50, 50, 100, 0],
        ];
        let p = problem(&[100, 100, 100, 45, 35], rows, 4, 100);

        let greedy = cheapest_insertion(&p);
        assert!(!greedy.unserved.is_empty());

        let chosen = construct(&p);
        assert!(chosen.unserved.is_empty());
        assert_eq!(chosen.loads.iter().sum::<u64>(), 380);
        for (load, vehicle) in chosen.loads.iter().zip(p.fleet().vehicles()) {
            assert!(*load <= vehicle.capacity);
        }
    }

    #[test]
    fn reinsert_places_only_what_fits() {
        let p = problem(&[60, 50, 30], line(4), 2, 100);
        let mut routes = vec![vec![1], vec![]];
        let mut loads = vec![60, 0];
        let mut unserved = vec![2, 3];

        let placed = reinsert(&p, &mut routes, &mut loads, &mut unserved);

        assert_eq!(placed, 2);
        assert!(unserved.is_empty());
        assert_eq!(loads.iter().sum::<u64>(), 140);
        for (load, vehicle) in loads.iter().zip(p.fleet().vehicles()) {
            assert!(*load <= vehicle.capacity);
        }

        let p = problem(&[60, 50, 30], line(4), 1, 110);
        let mut routes = vec![vec![1, 2]];
        let mut loads = vec![110];
        let mut unserved = vec![3];
        assert_eq!(reinsert(&p, &mut routes, &mut loads, &mut unserved), 0);
        assert_eq!(unserved, vec![3]);
        assert_eq!(routes, vec![vec![1, 2]]);
    }

    #[test]
    fn no_bins_means_empty_routes() {
        let p = problem(&[], vec![vec![0]], 2, 100);
        let c = construct(&p);
        assert_eq!(c.routes, vec![Vec::<usize>::new(), Vec::new()]);
        assert!(c.unserved.is_empty());
    }
}
