use std::collections::HashSet;

use crate::config::constant::MAX_QUANTITY;
use crate::distance::matrix::DistanceMatrix;
use crate::domain::types::{Fleet, Location};
use crate::error::ValidationError;

/// Validated, immutable solver input. Index 0 is the depot.
#[derive(Debug, Clone)]
pub struct RoutingProblem {
    locations: Vec<Location>,
    fleet: Fleet,
    distance_matrix: DistanceMatrix,
}

impl RoutingProblem {
    pub fn new(
        locations: Vec<Location>,
        fleet: Fleet,
        distance_matrix: DistanceMatrix,
    ) -> Result<Self, ValidationError> {
        let depot = locations.first().ok_or(ValidationError::MissingDepot)?;
        if depot.demand != 0 {
            return Err(ValidationError::DepotDemand {
                id: depot.id.clone(),
                demand: depot.demand,
            });
        }

        if distance_matrix.size() != locations.len() {
            return Err(ValidationError::MatrixDimension {
                rows: distance_matrix.size(),
                cols: distance_matrix.size(),
                locations: locations.len(),
            });
        }

        if let Some(location) = locations.iter().find(|l| l.demand > MAX_QUANTITY) {
            return Err(ValidationError::DemandTooLarge {
                id: location.id.clone(),
                demand: location.demand,
            });
        }

        let mut seen = HashSet::with_capacity(locations.len());
        for location in &locations {
            if !seen.insert(location.id.as_str()) {
                return Err(ValidationError::DuplicateId(location.id.clone()));
            }
        }

        Ok(Self {
            locations,
            fleet,
            distance_matrix,
        })
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn depot(&self) -> &Location {
        &self.locations[0]
    }

    /// Pickup locations, i.e. everything except the depot.
    pub fn bins(&self) -> &[Location] {
        &self.locations[1..]
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn distance_matrix(&self) -> &DistanceMatrix {
        &self.distance_matrix
    }

    pub fn demand(&self, index: usize) -> u64 {
        self.locations[index].demand
    }

    #[inline]
    pub fn distance(&self, from: usize, to: usize) -> u64 {
        self.distance_matrix.get(from, to)
    }

    pub fn total_demand(&self) -> u64 {
        self.locations
            .iter()
            .fold(0u64, |acc, l| acc.saturating_add(l.demand))
    }
}
