use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use binroute::config::PlannerConfig;
use binroute::distance::lookup::{BatchResult, DistanceLookup, Element};
use binroute::fixtures::data_generator::{demo_request, haversine_problem, random_request, SEED};
use binroute::report::plan::report;
use binroute::setup::init_types::DEPOT_ID;
use binroute::{
    Coordinate, CvrpSolver, DistanceMatrixBuilder, DistanceProvider, PlanError, RoutePlanner,
    ValidationError,
};
use futures::future::BoxFuture;
use futures::FutureExt;

/// Answers 1 km for every pair and counts the batches it was asked for.
struct CountingLookup {
    calls: Arc<AtomicUsize>,
}

impl DistanceLookup for CountingLookup {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn max_elements(&self) -> usize {
        usize::MAX
    }

    fn distance_batch<'a>(
        &'a self,
        origins: &'a [Coordinate],
        destinations: &'a [Coordinate],
    ) -> BoxFuture<'a, BatchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        async move {
            Ok(origins
                .iter()
                .map(|_| vec![Element::Meters(1_000); destinations.len()])
                .collect())
        }
        .boxed()
    }
}

fn counting_planner() -> (RoutePlanner, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let lookup = CountingLookup {
        calls: Arc::clone(&calls),
    };
    let planner = RoutePlanner::new(
        DistanceMatrixBuilder::new(DistanceProvider::new(Arc::new(lookup))),
        CvrpSolver::default(),
    );
    (planner, calls)
}

#[tokio::test]
async fn plans_random_request_end_to_end() {
    let request = random_request(SEED, 20, 3, 200);
    let planner = RoutePlanner::from_config(&PlannerConfig::default());

    let outcome = planner.plan_detailed(&request).await.unwrap();
    let plan = &outcome.plan;

    assert_eq!(outcome.matrix_stats.failed_batches, 0);
    assert_eq!(plan.routes.len(), 3);
    let served: usize = plan.routes.iter().map(|r| r.stops.len() - 2).sum();
    assert_eq!(served + plan.unserved.len(), 20);
    for route in &plan.routes {
        assert_eq!(route.stops.first().map(|s| s.id.as_str()), Some("depot"));
        assert_eq!(route.stops.last().map(|s| s.id.as_str()), Some("depot"));
        assert_eq!(route.legs.len(), route.stops.len() - 1);
        assert!(route.load <= route.capacity);
    }

    // same answer as solving the exact haversine matrix directly
    let direct = haversine_problem(&request).unwrap();
    let expected = report(&direct, &CvrpSolver::default().solve(&direct));
    assert_eq!(plan, &expected);
}

#[tokio::test]
async fn demo_request_reports_unserved_bin() {
    let planner = RoutePlanner::from_config(&PlannerConfig::default());
    let plan = planner.plan(&demo_request()).await.unwrap();

    assert!(!plan.feasible);
    assert_eq!(plan.unserved.len(), 1);
    assert_eq!(plan.vehicles_used(), 4);
    assert!(plan.routes[0].stops[0].address.is_some());
}

#[tokio::test]
async fn rejects_fill_level_above_full() {
    let mut request = demo_request();
    request.bins[2].fill_level = 150;

    let err = RoutePlanner::from_config(&PlannerConfig::default())
        .plan(&request)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PlanError::Validation(ValidationError::FillLevelOutOfRange { ref id, fill_level: 150 }) if id == "bin3"
    ));
}

#[tokio::test]
async fn rejects_duplicate_bin_ids() {
    let mut request = demo_request();
    request.bins[1].id = "bin1".to_string();

    let err = RoutePlanner::from_config(&PlannerConfig::default())
        .plan(&request)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PlanError::Validation(ValidationError::DuplicateId(ref id)) if id == "bin1"
    ));
}

#[tokio::test]
async fn rejects_empty_fleet() {
    let mut request = demo_request();
    request.fleet.vehicle_count = 0;

    let err = RoutePlanner::from_config(&PlannerConfig::default())
        .plan(&request)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PlanError::Validation(ValidationError::EmptyFleet)
    ));
}

#[tokio::test]
async fn bad_bin_ids_are_rejected_before_any_lookup() {
    let (planner, calls) = counting_planner();

    let mut duplicate = demo_request();
    duplicate.bins[3].id = "bin2".to_string();
    let err = planner.plan(&duplicate).await.unwrap_err();
    assert!(matches!(
        err,
        PlanError::Validation(ValidationError::DuplicateId(ref id)) if id == "bin2"
    ));

    let mut reserved = demo_request();
    reserved.bins[0].id = DEPOT_ID.to_string();
    let err = planner.plan(&reserved).await.unwrap_err();
    assert!(matches!(
        err,
        PlanError::Validation(ValidationError::ReservedId(ref id)) if id == DEPOT_ID
    ));

    assert_eq!(calls.load(Ordering::SeqCst), 0);

    planner.plan(&demo_request()).await.unwrap();
    assert!(calls.load(Ordering::SeqCst) > 0);
}
