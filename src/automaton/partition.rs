//! Balanced split of the lattice's row-pairs across workers.

use crate::error::{HppError, Result};

/// The contiguous run of row-pairs owned by one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BandRange {
    /// Number of row-pairs owned.
    pub count: usize,
    /// Index of the first owned row-pair.
    pub offset: usize,
}

impl BandRange {
    /// First owned lattice row.
    #[inline]
    pub fn first_row(&self) -> usize {
        2 * self.offset
    }

    /// Number of owned lattice rows.
    #[inline]
    pub fn rows(&self) -> usize {
        2 * self.count
    }
}

/// One `BandRange` per worker, in rank order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    ranges: Vec<BandRange>,
}

impl Partition {
    /// Split `total_row_pairs` over `workers` ranks.
    ///
    /// Worker `k` starts at `floor(total*k/workers)` and ends before
    /// `floor(total*(k+1)/workers)`, so counts differ by at most one.
    pub fn new(total_row_pairs: usize, workers: usize) -> Result<Partition> {
        if workers == 0 {
            return Err(HppError::NoWorkers);
        }
        if workers > total_row_pairs {
            return Err(HppError::TooManyWorkers {
                workers,
                row_pairs: total_row_pairs,
            });
        }

        let ranges = (0..workers)
            .map(|k| {
                let start = total_row_pairs * k / workers;
                let end = total_row_pairs * (k + 1) / workers;
                BandRange {
                    count: end - start,
                    offset: start,
                }
            })
            .collect();

        Ok(Partition { ranges })
    }

    /// Partition for an N×N lattice: `N/2` row-pairs.
    pub fn for_lattice(size: usize, workers: usize) -> Result<Partition> {
        Partition::new(size / 2, workers)
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    pub fn band(&self, rank: usize) -> BandRange {
        self.ranges[rank]
    }

    pub fn ranges(&self) -> &[BandRange] {
        &self.ranges
    }

    pub fn total_row_pairs(&self) -> usize {
        self.ranges.iter().map(|r| r.count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_split() {
        let p = Partition::new(8, 4).unwrap();
        let counts: Vec<usize> = p.ranges().iter().map(|r| r.count).collect();
        let offsets: Vec<usize> = p.ranges().iter().map(|r| r.offset).collect();
        assert_eq!(counts, vec![2, 2, 2, 2]);
        assert_eq!(offsets, vec![0, 2, 4, 6]);
    }

    #[test]
    fn test_uneven_split_matches_formula() {
        // floor(10k/3): 0, 3, 6, 10
        let p = Partition::new(10, 3).unwrap();
        assert_eq!(p.band(0), BandRange { count: 3, offset: 0 });
        assert_eq!(p.band(1), BandRange { count: 3, offset: 3 });
        assert_eq!(p.band(2), BandRange { count: 4, offset: 6 });
        assert_eq!(p.band(2).first_row(), 12);
        assert_eq!(p.band(2).rows(), 8);
    }

    #[test]
    fn test_balanced_contiguous_for_all_valid_inputs() {
        for total in 1..=40 {
            for workers in 1..=total {
                let p = Partition::new(total, workers).unwrap();
                assert_eq!(p.workers(), workers);
                assert_eq!(p.total_row_pairs(), total);

                let mut expected_offset = 0;
                for range in p.ranges() {
                    assert_eq!(range.offset, expected_offset, "gap at {total}/{workers}");
                    assert!(range.count >= 1, "empty band at {total}/{workers}");
                    expected_offset += range.count;
                }

                let min = p.ranges().iter().map(|r| r.count).min().unwrap();
                let max = p.ranges().iter().map(|r| r.count).max().unwrap();
                assert!(max - min <= 1, "unbalanced split {total}/{workers}");
            }
        }
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(Partition::new(17, 5).unwrap(), Partition::new(17, 5).unwrap());
    }

    #[test]
    fn test_too_many_workers() {
        assert!(matches!(
            Partition::for_lattice(8, 5),
            Err(HppError::TooManyWorkers {
                workers: 5,
                row_pairs: 4
            })
        ));
        assert!(Partition::for_lattice(8, 4).is_ok());
    }

    #[test]
    fn test_zero_workers() {
        assert!(matches!(Partition::new(4, 0), Err(HppError::NoWorkers)));
    }
}
