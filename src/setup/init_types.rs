use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::constant::MAX_FILL_LEVEL;
use crate::domain::types::{Coordinate, Fleet, Location};
use crate::error::ValidationError;

/// Point on the map as sent by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceInput {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
}

impl PlaceInput {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinInput {
    pub id: String,
    pub location: PlaceInput,
    /// Percent full, used directly as demand.
    pub fill_level: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetInput {
    pub vehicle_count: usize,
    pub capacity: u64,
}

/// JSON body describing one planning request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub depot: PlaceInput,
    pub bins: Vec<BinInput>,
    pub fleet: FleetInput,
}

/// Id given to the depot location.
pub const DEPOT_ID: &str = "depot";

impl RouteRequest {
    /// Depot followed by the bins, in request order. Runs before any distance
    /// lookup, so bad ids never cost a round of requests.
    pub fn locations(&self) -> Result<Vec<Location>, ValidationError> {
        let mut ids = HashSet::with_capacity(self.bins.len());
        for bin in &self.bins {
            if bin.id == DEPOT_ID {
                return Err(ValidationError::ReservedId(bin.id.clone()));
            }
            if !ids.insert(bin.id.as_str()) {
                return Err(ValidationError::DuplicateId(bin.id.clone()));
            }
        }

        let mut locations = Vec::with_capacity(self.bins.len() + 1);
        locations.push(place_to_location(DEPOT_ID, &self.depot, 0));

        for bin in &self.bins {
            if bin.fill_level < 0 {
                return Err(ValidationError::NegativeDemand {
                    id: bin.id.clone(),
                    demand: bin.fill_level,
                });
            }
            if bin.fill_level > MAX_FILL_LEVEL {
                return Err(ValidationError::FillLevelOutOfRange {
                    id: bin.id.clone(),
                    fill_level: bin.fill_level,
                });
            }
            locations.push(place_to_location(
                &bin.id,
                &bin.location,
                bin.fill_level as u64,
            ));
        }

        Ok(locations)
    }

    pub fn fleet(&self) -> Result<Fleet, ValidationError> {
        Fleet::homogeneous(self.fleet.vehicle_count, self.fleet.capacity)
    }
}

fn place_to_location(id: &str, place: &PlaceInput, demand: u64) -> Location {
    let location = Location::new(id, place.coordinate(), demand);
    match &place.formatted_address {
        Some(address) => location.with_address(address.clone()),
        None => location,
    }
}
