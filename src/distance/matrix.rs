use serde::Serialize;

use crate::config::constant::UNREACHABLE_PENALTY;
use crate::error::ValidationError;

/// Dense square matrix of travel distances in meters, row-major.
///
/// Entries are finite by construction; a pair with no route holds
/// [`UNREACHABLE_PENALTY`]. The matrix may be asymmetric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistanceMatrix {
    size: usize,
    data: Vec<u64>,
}

impl DistanceMatrix {
    /// Build from explicit rows. Rows must form a square with a zero diagonal.
    ///
    /// Entries above [`UNREACHABLE_PENALTY`] (e.g. `u64::MAX` used as a "no
    /// route" marker) are clamped to it.
    pub fn from_rows(rows: Vec<Vec<u64>>) -> Result<Self, ValidationError> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        for row in rows {
            if row.len() != size {
                return Err(ValidationError::MatrixDimension {
                    rows: size,
                    cols: row.len(),
                    locations: size,
                });
            }
            data.extend(row.into_iter().map(clamp));
        }
        for index in 0..size {
            let value = data[index * size + index];
            if value != 0 {
                return Err(ValidationError::NonZeroDiagonal { index, value });
            }
        }
        Ok(Self { size, data })
    }

    pub(crate) fn from_flat(size: usize, data: Vec<u64>) -> Self {
        debug_assert_eq!(data.len(), size * size);
        Self {
            size,
            data: data.into_iter().map(clamp).collect(),
        }
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> u64 {
        self.data[from * self.size + to]
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| ((i + 1)..self.size).all(|j| self.get(i, j) == self.get(j, i)))
    }

    /// Sum of consecutive legs along `path`.
    pub fn path_distance(&self, path: &[usize]) -> u64 {
        path.windows(2).map(|leg| self.get(leg[0], leg[1])).sum()
    }
}

#[inline]
fn clamp(meters: u64) -> u64 {
    meters.min(UNREACHABLE_PENALTY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_square_and_bad_diagonal() {
        assert_eq!(
            DistanceMatrix::from_rows(vec![vec![0, 1], vec![1]]),
            Err(ValidationError::MatrixDimension {
                rows: 2,
                cols: 1,
                locations: 2
            })
        );
        assert_eq!(
            DistanceMatrix::from_rows(vec![vec![0, 1], vec![1, 5]]),
            Err(ValidationError::NonZeroDiagonal { index: 1, value: 5 })
        );
    }

    #[test]
    fn oversized_entries_clamp_to_penalty() {
        let dm = DistanceMatrix::from_rows(vec![
            vec![0, 10, 10],
            vec![10, 0, u64::MAX],
            vec![10, UNREACHABLE_PENALTY + 1, 0],
        ])
        .unwrap();
        assert_eq!(dm.get(1, 2), UNREACHABLE_PENALTY);
        assert_eq!(dm.get(2, 1), UNREACHABLE_PENALTY);
        assert_eq!(dm.get(0, 1), 10);
        assert!(dm.is_symmetric());
    }

    #[test]
    fn path_distance_sums_legs() {
        let dm =
            DistanceMatrix::from_rows(vec![vec![0, 10, 20], vec![10, 0, 15], vec![20, 15, 0]])
                .unwrap();
        assert_eq!(dm.path_distance(&[0, 1, 2, 0]), 45);
        assert_eq!(dm.path_distance(&[0, 0]), 0);
    }
}
