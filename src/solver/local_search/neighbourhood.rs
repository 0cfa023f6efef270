use crate::config::constant::MAX_SEGMENT_LEN;
use crate::distance::matrix::DistanceMatrix;
use crate::domain::problem::RoutingProblem;
use crate::evaluation::fitness::d;

/// Vehicle routes under improvement: stops without the depot, plus loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RouteSet {
    pub routes: Vec<Vec<usize>>,
    pub loads: Vec<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Move {
    /// Reverse `stops[start..=end]` of one route.
    TwoOpt {
        vehicle: usize,
        start: usize,
        end: usize,
    },
    /// Move `len` consecutive stops starting at `start` from route `from`
    /// into route `to`, before its stop `position`.
    Relocate {
        from: usize,
        start: usize,
        len: usize,
        to: usize,
        position: usize,
    },
    /// Exchange one stop of route `first` with one stop of route `second`.
    Swap {
        first: usize,
        first_pos: usize,
        second: usize,
        second_pos: usize,
    },
}

impl Move {
    /// Ordering used to break ties between equally improving moves: lowest
    /// vehicle, then lowest position, then move kind and the remaining fields.
    fn tie_key(&self) -> (usize, usize, u8, usize, usize, usize) {
        match *self {
            Move::TwoOpt {
                vehicle,
                start,
                end,
            } => (vehicle, start, 0, 0, end, 0),
            Move::Relocate {
                from,
                start,
                len,
                to,
                position,
            } => (from, start, 1, to, position, len),
            Move::Swap {
                first,
                first_pos,
                second,
                second_pos,
            } => (first, first_pos, 2, second, second_pos, 0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub delta: i64,
    pub mv: Move,
}

impl Candidate {
    fn better_than(&self, other: &Candidate) -> bool {
        (self.delta, self.mv.tie_key()) < (other.delta, other.mv.tie_key())
    }
}

fn offer(best: &mut Option<Candidate>, candidate: Candidate) {
    if candidate.delta < 0 && best.map_or(true, |b| candidate.better_than(&b)) {
        *best = Some(candidate);
    }
}

#[inline]
fn stop_or_depot(stops: &[usize], position: Option<usize>) -> usize {
    position.and_then(|p| stops.get(p).copied()).unwrap_or(0)
}

/// Best strictly improving, capacity-feasible move over the whole
/// neighbourhood, or `None` at a local optimum.
pub(crate) fn best_move(problem: &RoutingProblem, set: &RouteSet) -> Option<Candidate> {
    let mut best = None;
    two_opt_moves(problem.distance_matrix(), set, &mut best);
    relocate_moves(problem, set, &mut best);
    swap_moves(problem, set, &mut best);
    best
}

/// Intra-route 2-opt. Uses forward and backward prefix sums of the path so
/// that reversing a segment is priced correctly on asymmetric matrices.
fn two_opt_moves(dm: &DistanceMatrix, set: &RouteSet, best: &mut Option<Candidate>) {
    for (vehicle, stops) in set.routes.iter().enumerate() {
        if stops.len() < 2 {
            continue;
        }
        let mut path = Vec::with_capacity(stops.len() + 2);
        path.push(0);
        path.extend_from_slice(stops);
        path.push(0);

        let mut forward = vec![0i64; path.len()];
        let mut backward = vec![0i64; path.len()];
        for t in 1..path.len() {
            forward[t] = forward[t - 1] + d(dm, path[t - 1], path[t]);
            backward[t] = backward[t - 1] + d(dm, path[t], path[t - 1]);
        }

        for start in 0..stops.len() - 1 {
            for end in (start + 1)..stops.len() {
                let (a, b) = (start + 1, end + 1);
                let old = d(dm, path[a - 1], path[a]) + (forward[b] - forward[a])
                    + d(dm, path[b], path[b + 1]);
                let new = d(dm, path[a - 1], path[b]) + (backward[b] - backward[a])
                    + d(dm, path[a], path[b + 1]);
                offer(
                    best,
                    Candidate {
                        delta: new - old,
                        mv: Move::TwoOpt {
                            vehicle,
                            start,
                            end,
                        },
                    },
                );
            }
        }
    }
}

/// Inter-route relocation of segments of 1..=MAX_SEGMENT_LEN stops, kept in
/// their original direction.
fn relocate_moves(problem: &RoutingProblem, set: &RouteSet, best: &mut Option<Candidate>) {
    let dm = problem.distance_matrix();
    for (from, stops) in set.routes.iter().enumerate() {
        for len in 1..=MAX_SEGMENT_LEN.min(stops.len()) {
            for start in 0..=(stops.len() - len) {
                let segment = &stops[start..start + len];
                let (first, last) = (segment[0], segment[len - 1]);
                let segment_load: u64 = segment.iter().map(|&s| problem.demand(s)).sum();

                let prev = stop_or_depot(stops, start.checked_sub(1));
                let next = stop_or_depot(stops, Some(start + len));
                let removal_gain = d(dm, prev, first) + d(dm, last, next) - d(dm, prev, next);

                for (to, target) in set.routes.iter().enumerate() {
                    if to == from
                        || set.loads[to].saturating_add(segment_load) > problem.fleet().capacity(to)
                    {
                        continue;
                    }
                    for position in 0..=target.len() {
                        let t_prev = stop_or_depot(target, position.checked_sub(1));
                        let t_next = stop_or_depot(target, Some(position));
                        let insert_cost =
                            d(dm, t_prev, first) + d(dm, last, t_next) - d(dm, t_prev, t_next);
                        offer(
                            best,
                            Candidate {
                                delta: insert_cost - removal_gain,
                                mv: Move::Relocate {
                                    from,
                                    start,
                                    len,
                                    to,
                                    position,
                                },
                            },
                        );
                    }
                }
            }
        }
    }
}

/// Change in route length when the stop at `pos` is replaced by `incoming`.
fn replace_delta(dm: &DistanceMatrix, stops: &[usize], pos: usize, incoming: usize) -> i64 {
    let prev = stop_or_depot(stops, pos.checked_sub(1));
    let next = stop_or_depot(stops, Some(pos + 1));
    let outgoing = stops[pos];
    d(dm, prev, incoming) + d(dm, incoming, next) - d(dm, prev, outgoing) - d(dm, outgoing, next)
}

/// Inter-route exchange of two single stops.
fn swap_moves(problem: &RoutingProblem, set: &RouteSet, best: &mut Option<Candidate>) {
    let dm = problem.distance_matrix();
    let routes = &set.routes;
    for first in 0..routes.len() {
        for second in (first + 1)..routes.len() {
            for (first_pos, &x) in routes[first].iter().enumerate() {
                for (second_pos, &y) in routes[second].iter().enumerate() {
                    let (dx, dy) = (problem.demand(x), problem.demand(y));
                    if (set.loads[first] - dx).saturating_add(dy) > problem.fleet().capacity(first)
                        || (set.loads[second] - dy).saturating_add(dx)
                            > problem.fleet().capacity(second)
                    {
                        continue;
                    }
                    let delta = replace_delta(dm, &routes[first], first_pos, y)
                        + replace_delta(dm, &routes[second], second_pos, x);
                    offer(
                        best,
                        Candidate {
                            delta,
                            mv: Move::Swap {
                                first,
                                first_pos,
                                second,
                                second_pos,
                            },
                        },
                    );
                }
            }
        }
    }
}

/// Apply `mv` in place, keeping loads in sync.
pub(crate) fn apply(problem: &RoutingProblem, set: &mut RouteSet, mv: Move) {
    match mv {
        Move::TwoOpt {
            vehicle,
            start,
            end,
        } => set.routes[vehicle][start..=end].reverse(),
        Move::Relocate {
            from,
            start,
            len,
            to,
            position,
        } => {
            let segment: Vec<usize> = set.routes[from].drain(start..start + len).collect();
            let moved: u64 = segment.iter().map(|&s| problem.demand(s)).sum();
            set.loads[from] -= moved;
            set.loads[to] += moved;
            set.routes[to].splice(position..position, segment);
        }
        Move::Swap {
            first,
            first_pos,
            second,
            second_pos,
        } => {
            let x = set.routes[first][first_pos];
            let y = set.routes[second][second_pos];
            set.routes[first][first_pos] = y;
            set.routes[second][second_pos] = x;
            set.loads[first] = set.loads[first] - problem.demand(x) + problem.demand(y);
            set.loads[second] = set.loads[second] - problem.demand(y) + problem.demand(x);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Coordinate, Fleet, Location};
    use crate::evaluation::fitness::{route_load, total_distance};

    fn problem(demands: &[u64], rows: Vec<Vec<u64>>, capacities: &[u64]) -> RoutingProblem {
        let mut locations = vec![Location::depot("depot", Coordinate::new(0.0, 0.0))];
        for (i, &demand) in demands.iter().enumerate() {
            locations.push(Location::new(format!("b{}", i + 1), Coordinate::new(0.0, 0.0), demand));
        }
        let fleet = Fleet::new(
            capacities
                .iter()
                .map(|&capacity| crate::domain::types::Vehicle { capacity })
                .collect(),
        )
        .unwrap();
        RoutingProblem::new(locations, fleet, DistanceMatrix::from_rows(rows).unwrap()).unwrap()
    }

    fn grid(points: &[(i64, i64)]) -> Vec<Vec<u64>> {
        points
            .iter()
            .map(|a| {
                points
                    .iter()
                    .map(|b| ((a.0 - b.0).abs() + (a.1 - b.1).abs()) as u64)
                    .collect()
            })
            .collect()
    }

    fn route_set(problem: &RoutingProblem, routes: Vec<Vec<usize>>) -> RouteSet {
        let loads = routes.iter().map(|r| route_load(r, problem)).collect();
        RouteSet { routes, loads }
    }

    /// Every candidate's delta must match the recomputed change in distance.
    fn assert_delta_consistent(problem: &RoutingProblem, set: &RouteSet) {
        let dm = problem.distance_matrix();
        if let Some(candidate) = best_move(problem, set) {
            let before = total_distance(&set.routes, dm) as i64;
            let mut after_set = set.clone();
            apply(problem, &mut after_set, candidate.mv);
            let after = total_distance(&after_set.routes, dm) as i64;
            assert_eq!(after - before, candidate.delta, "{:?}", candidate.mv);
            for (v, load) in after_set.loads.iter().enumerate() {
                assert_eq!(*load, route_load(&after_set.routes[v], problem));
                assert!(*load <= problem.fleet().capacity(v));
            }
        }
    }

    #[test]
    fn two_opt_uncrosses_a_route() {
        // square: depot (0,0), 1 (0,10), 2 (10,10), 3 (10,0)
        let p = problem(&[1, 1, 1], grid(&[(0, 0), (0, 10), (10, 10), (10, 0)]), &[10]);
        let set = route_set(&p, vec![vec![2, 1, 3]]);
        let best = best_move(&p, &set).unwrap();
        assert!(best.delta < 0);
        assert!(matches!(best.mv, Move::TwoOpt { vehicle: 0, .. }));
        assert_delta_consistent(&p, &set);
    }

    #[test]
    fn two_opt_prices_reversal_on_asymmetric_matrix() {
        let rows = vec![
            vec![0, 1, 50, 50],
            vec![50, 0, 1, 50],
            vec![50, 50, 0, 1],
            vec![1, 50, 50, 0],
        ];
        let p = problem(&[1, 1, 1], rows, &[10]);
        // 0 -> 1 -> 2 -> 3 -> 0 costs 4; any reversal only gets worse.
        let set = route_set(&p, vec![vec![1, 2, 3]]);
        assert_eq!(best_move(&p, &set), None);

        let set = route_set(&p, vec![vec![3, 2, 1]]);
        assert_delta_consistent(&p, &set);
    }

    #[test]
    fn relocate_moves_a_stop_to_a_nearby_route() {
        // Two clusters; stop 2 sits in the wrong route.
        let p = problem(
            &[1, 1, 1, 1],
            grid(&[(0, 0), (0, 10), (0, 11), (20, 0), (21, 0)]),
            &[10, 10],
        );
        let set = route_set(&p, vec![vec![1], vec![3, 2, 4]]);
        let best = best_move(&p, &set).unwrap();
        assert!(best.delta < 0);
        assert_delta_consistent(&p, &set);
    }

    #[test]
    fn relocate_respects_capacity() {
        let p = problem(
            &[5, 5, 5, 5],
            grid(&[(0, 0), (0, 10), (0, 11), (20, 0), (21, 0)]),
            &[5, 15],
        );
        let set = route_set(&p, vec![vec![1], vec![3, 2, 4]]);
        if let Some(candidate) = best_move(&p, &set) {
            assert!(!matches!(candidate.mv, Move::Relocate { to: 0, .. }));
        }
        assert_delta_consistent(&p, &set);
    }

    #[test]
    fn swap_exchanges_misplaced_stops() {
        let p = problem(
            &[5, 5, 5, 5],
            grid(&[(0, 0), (0, 10), (0, 11), (20, 0), (21, 0)]),
            &[10, 10],
        );
        // Full trucks: only swaps are feasible across routes.
        let set = route_set(&p, vec![vec![1, 3], vec![2, 4]]);
        let best = best_move(&p, &set).unwrap();
        assert!(best.delta < 0);
        assert_delta_consistent(&p, &set);
    }

    #[test]
    fn segment_relocation_keeps_order() {
        let p = problem(&[1, 1, 1], grid(&[(0, 0), (5, 0), (6, 0), (7, 0)]), &[10, 10]);
        let mut set = route_set(&p, vec![vec![1, 2, 3], vec![]]);
        apply(
            &p,
            &mut set,
            Move::Relocate {
                from: 0,
                start: 1,
                len: 2,
                to: 1,
                position: 0,
            },
        );
        assert_eq!(set.routes, vec![vec![1], vec![2, 3]]);
        assert_eq!(set.loads, vec![1, 2]);
    }

    #[test]
    fn equal_deltas_prefer_lower_vehicle() {
        let a = Candidate {
            delta: -5,
            mv: Move::Swap {
                first: 0,
                first_pos: 3,
                second: 1,
                second_pos: 0,
            },
        };
        let b = Candidate {
            delta: -5,
            mv: Move::TwoOpt {
                vehicle: 1,
                start: 0,
                end: 1,
            },
        };
        assert!(a.better_than(&b));
        assert!(!b.better_than(&a));
    }
}
