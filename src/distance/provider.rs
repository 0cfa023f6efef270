use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{trace, warn};

use crate::config::constant::{LOOKUP_TIMEOUT_SECS, UNREACHABLE_PENALTY};
use crate::distance::haversine::haversine_meters;
use crate::distance::lookup::{DistanceLookup, Element};
use crate::domain::types::Coordinate;
use crate::error::ProviderError;

/// Distance source that never fails.
///
/// Asks the configured [`DistanceLookup`] first and falls back to the
/// haversine distance when the lookup errors, times out or leaves the pair
/// out. Cloning is cheap; clones share the lookup.
#[derive(Clone)]
pub struct DistanceProvider {
    lookup: Arc<dyn DistanceLookup>,
    timeout: Duration,
}

impl DistanceProvider {
    pub fn new(lookup: Arc<dyn DistanceLookup>) -> Self {
        Self {
            lookup,
            timeout: Duration::from_secs(LOOKUP_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn lookup_name(&self) -> &'static str {
        self.lookup.name()
    }

    pub fn max_elements(&self) -> usize {
        self.lookup.max_elements().max(1)
    }

    pub fn max_dimension(&self) -> usize {
        self.lookup.max_dimension().max(1)
    }

    /// Distance in meters from `origin` to `destination`.
    pub async fn distance(&self, origin: Coordinate, destination: Coordinate) -> u64 {
        match self.try_batch(&[origin], &[destination]).await {
            Ok(rows) => resolve(rows[0][0], origin, destination),
            Err(e) => {
                warn!(
                    "{} lookup failed, using haversine fallback: {}",
                    self.lookup.name(),
                    e
                );
                haversine_meters(origin, destination)
            }
        }
    }

    /// Batched lookup bounded by the timeout. The answer is checked to be
    /// exactly `origins.len()` rows of `destinations.len()` elements.
    pub async fn try_batch(
        &self,
        origins: &[Coordinate],
        destinations: &[Coordinate],
    ) -> Result<Vec<Vec<Element>>, ProviderError> {
        let rows = timeout(
            self.timeout,
            self.lookup.distance_batch(origins, destinations),
        )
        .await
        .map_err(|_| ProviderError::Timeout(self.timeout))??;

        if rows.len() != origins.len() || rows.iter().any(|r| r.len() != destinations.len()) {
            return Err(ProviderError::Incomplete {
                expected_rows: origins.len(),
                expected_cols: destinations.len(),
                rows: rows.len(),
            });
        }
        Ok(rows)
    }
}

/// Turn one lookup element into meters.
pub fn resolve(element: Element, origin: Coordinate, destination: Coordinate) -> u64 {
    match element {
        Element::Meters(meters) => meters.min(UNREACHABLE_PENALTY),
        Element::NoRoute => UNREACHABLE_PENALTY,
        Element::Missing => {
            trace!(
                "missing element for ({}, {}) -> ({}, {}), using haversine",
                origin.lat,
                origin.lon,
                destination.lat,
                destination.lon
            );
            haversine_meters(origin, destination)
        }
    }
}
