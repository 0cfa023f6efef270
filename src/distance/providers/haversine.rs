use futures::future::{self, BoxFuture};
use futures::FutureExt;

use crate::distance::haversine::haversine_meters;
use crate::distance::lookup::{BatchResult, DistanceLookup, Element};
use crate::domain::types::Coordinate;

/// Answers every pair with the great-circle distance. Used when no routing
/// service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaversineLookup;

impl DistanceLookup for HaversineLookup {
    fn name(&self) -> &'static str {
        "haversine"
    }

    fn max_elements(&self) -> usize {
        usize::MAX
    }

    fn distance_batch<'a>(
        &'a self,
        origins: &'a [Coordinate],
        destinations: &'a [Coordinate],
    ) -> BoxFuture<'a, BatchResult> {
        let rows = origins
            .iter()
            .map(|&o| {
                destinations
                    .iter()
                    .map(|&d| Element::Meters(haversine_meters(o, d)))
                    .collect()
            })
            .collect();
        future::ready(Ok(rows)).boxed()
    }
}
