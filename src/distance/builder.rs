use futures::future::join_all;
use tokio::task;
use tracing::{debug, info, warn};

use crate::config::constant::UNREACHABLE_PENALTY;
use crate::distance::haversine::haversine_meters;
use crate::distance::lookup::Element;
use crate::distance::matrix::DistanceMatrix;
use crate::distance::provider::{resolve, DistanceProvider};
use crate::domain::types::Coordinate;
use crate::error::ProviderError;

/// What happened while assembling one matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatrixStats {
    pub batches: usize,
    pub failed_batches: usize,
    pub fallback_entries: usize,
    pub unreachable_entries: usize,
}

/// Rectangular block of the matrix fetched with one lookup call.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Tile {
    rows: std::ops::Range<usize>,
    cols: std::ops::Range<usize>,
}

/// Assembles the full pairwise matrix from batched lookups.
#[derive(Clone)]
pub struct DistanceMatrixBuilder {
    provider: DistanceProvider,
}

impl DistanceMatrixBuilder {
    pub fn new(provider: DistanceProvider) -> Self {
        Self { provider }
    }

    /// Build the matrix for `coords`, in order. Never fails: a batch that errors
    /// or times out is filled with haversine distances.
    pub async fn build(&self, coords: &[Coordinate]) -> (DistanceMatrix, MatrixStats) {
        let n = coords.len();
        let mut stats = MatrixStats::default();
        if n == 0 {
            return (DistanceMatrix::from_flat(0, vec![]), stats);
        }

        let tiles = plan_tiles(
            n,
            self.provider.max_elements(),
            self.provider.max_dimension(),
        );
        stats.batches = tiles.len();
        info!(
            "Building {}x{} distance matrix via '{}' in {} batch(es)",
            n,
            n,
            self.provider.lookup_name(),
            tiles.len()
        );

        let tasks = tiles.iter().cloned().map(|tile| {
            let provider = self.provider.clone();
            let origins = coords[tile.rows.clone()].to_vec();
            let destinations = coords[tile.cols.clone()].to_vec();
            task::spawn(async move { provider.try_batch(&origins, &destinations).await })
        });
        let results = join_all(tasks).await;

        let mut data = vec![0u64; n * n];
        for (batch, (tile, joined)) in tiles.iter().zip(results).enumerate() {
            let outcome = joined.unwrap_or_else(|e| {
                Err(ProviderError::Decode(format!("lookup task aborted: {}", e)))
            });
            match outcome {
                Ok(rows) => {
                    debug!("Batch {} answered rows {:?}", batch, tile.rows);
                    for (origin, row) in tile.rows.clone().zip(rows) {
                        for (dest, element) in tile.cols.clone().zip(row) {
                            if origin == dest {
                                continue;
                            }
                            match element {
                                Element::Missing => stats.fallback_entries += 1,
                                Element::NoRoute => stats.unreachable_entries += 1,
                                Element::Meters(m) if m >= UNREACHABLE_PENALTY => {
                                    stats.unreachable_entries += 1
                                }
                                Element::Meters(_) => {}
                            }
                            data[origin * n + dest] = resolve(element, coords[origin], coords[dest]);
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        "Batch {} (rows {:?}) failed, using haversine fallback: {}",
                        batch, tile.rows, e
                    );
                    stats.failed_batches += 1;
                    for origin in tile.rows.clone() {
                        for dest in tile.cols.clone() {
                            if origin == dest {
                                continue;
                            }
                            stats.fallback_entries += 1;
                            data[origin * n + dest] = haversine_meters(coords[origin], coords[dest]);
                        }
                    }
                }
            }
        }

        info!(
            "Distance matrix ready: {} batch(es), {} failed, {} fallback entries, {} unreachable",
            stats.batches, stats.failed_batches, stats.fallback_entries, stats.unreachable_entries
        );
        (DistanceMatrix::from_flat(n, data), stats)
    }
}

/// Split an `n x n` matrix into tiles of at most `max_elements` cells and at
/// most `max_dimension` rows and columns.
///
/// Whole rows are batched `floor(max_elements / n)` at a time; destinations
/// are split only when a single row exceeds either limit.
fn plan_tiles(n: usize, max_elements: usize, max_dimension: usize) -> Vec<Tile> {
    let max_dimension = max_dimension.max(1);
    let cols_per_tile = n.min(max_elements.max(1)).min(max_dimension);
    let rows_per_tile = (max_elements / cols_per_tile).clamp(1, max_dimension);

    let mut tiles = Vec::new();
    for row_start in (0..n).step_by(rows_per_tile) {
        for col_start in (0..n).step_by(cols_per_tile) {
            tiles.push(Tile {
                rows: row_start..row_start.saturating_add(rows_per_tile).min(n),
                cols: col_start..(col_start + cols_per_tile).min(n),
            });
        }
    }
    tiles
}
