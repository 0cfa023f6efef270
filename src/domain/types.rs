use serde::{Deserialize, Serialize};

use crate::config::constant::MAX_QUANTITY;
use crate::error::ValidationError;

/// Latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub coordinate: Coordinate,
    pub demand: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Location {
    pub fn new(id: impl Into<String>, coordinate: Coordinate, demand: u64) -> Self {
        Self {
            id: id.into(),
            coordinate,
            demand,
            address: None,
        }
    }

    pub fn depot(id: impl Into<String>, coordinate: Coordinate) -> Self {
        Self::new(id, coordinate, 0)
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub capacity: u64,
}

/// Ordered, non-empty list of vehicles. Vehicle index is the position in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fleet {
    vehicles: Vec<Vehicle>,
}

impl Fleet {
    pub fn new(vehicles: Vec<Vehicle>) -> Result<Self, ValidationError> {
        if vehicles.is_empty() {
            return Err(ValidationError::EmptyFleet);
        }
        if let Some(vehicle) = vehicles.iter().position(|v| v.capacity == 0) {
            return Err(ValidationError::ZeroCapacity { vehicle });
        }
        if let Some((vehicle, v)) = vehicles
            .iter()
            .enumerate()
            .find(|(_, v)| v.capacity > MAX_QUANTITY)
        {
            return Err(ValidationError::CapacityTooLarge {
                vehicle,
                capacity: v.capacity,
            });
        }
        Ok(Self { vehicles })
    }

    /// `count` identical vehicles of the given capacity.
    pub fn homogeneous(count: usize, capacity: u64) -> Result<Self, ValidationError> {
        Self::new(vec![Vehicle { capacity }; count])
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn capacity(&self, vehicle: usize) -> u64 {
        self.vehicles[vehicle].capacity
    }

    pub fn total_capacity(&self) -> u64 {
        self.vehicles
            .iter()
            .fold(0u64, |acc, v| acc.saturating_add(v.capacity))
    }
}
