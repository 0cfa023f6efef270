use futures::future::BoxFuture;

use crate::domain::types::Coordinate;
use crate::error::ProviderError;

/// One cell of a batched lookup answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Meters(u64),
    /// The service answered that the pair is not connected.
    NoRoute,
    /// The service left this cell out or marked it as not found.
    Missing,
}

pub type BatchResult = Result<Vec<Vec<Element>>, ProviderError>;

/// Fallible external distance service.
///
/// `distance_batch` answers one row per origin with one element per
/// destination. Implementations only report what the service said; falling
/// back is the caller's job.
pub trait DistanceLookup: Send + Sync {
    fn name(&self) -> &'static str;

    /// Largest `origins.len() * destinations.len()` accepted per call.
    fn max_elements(&self) -> usize;

    /// Largest number of origins, and of destinations, accepted per call.
    fn max_dimension(&self) -> usize {
        usize::MAX
    }

    fn distance_batch<'a>(
        &'a self,
        origins: &'a [Coordinate],
        destinations: &'a [Coordinate],
    ) -> BoxFuture<'a, BatchResult>;
}
