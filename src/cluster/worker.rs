//! A worker's private band and the local half of each step.

use super::comm::Endpoint;
use super::exchange::{exchange_rows, Direction};
use crate::automaton::partition::BandRange;
use crate::automaton::stepping::{collide, Phase};
use crate::error::Result;
use crate::state::Cell;

/// Two `(2*count + 1) × width` buffers owned by one worker.
///
/// Between steps `current[0..2*count)` holds the worker's rows. The EVEN
/// pass writes them to `scratch`, whose last row is the ghost row filled by
/// the backward exchange. The ODD pass reads `scratch[1..=2*count]` and
/// writes `current[1..=2*count]`: local row `q` is then global row
/// `first_row + q`, and row `2*count` belongs to the next band.
pub struct LocalBand {
    range: BandRange,
    width: usize,
    current: Vec<Cell>,
    scratch: Vec<Cell>,
}

impl LocalBand {
    /// Allocate both buffers once; they are reused for every step.
    pub fn new(range: BandRange, width: usize) -> LocalBand {
        let len = (range.rows() + 1) * width;
        LocalBand {
            range,
            width,
            current: vec![Cell::Empty; len],
            scratch: vec![Cell::Empty; len],
        }
    }

    #[inline]
    pub fn range(&self) -> BandRange {
        self.range
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of authoritative rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.range.rows()
    }

    /// The authoritative rows, aligned so row 0 is the band's first row.
    pub fn rows_mut(&mut self) -> &mut [Cell] {
        let end = self.rows() * self.width;
        &mut self.current[..end]
    }

    pub fn aligned(&self) -> &[Cell] {
        &self.current[..self.rows() * self.width]
    }

    /// Output of the ODD pass: global rows `first_row + 1 ..= first_row + 2*count`.
    pub fn shifted(&self) -> &[Cell] {
        &self.current[self.width..]
    }

    /// The last ODD output row, which belongs to the successor's band.
    pub fn spill_row(&self) -> &[Cell] {
        let start = self.rows() * self.width;
        &self.current[start..start + self.width]
    }

    /// EVEN collision pass over the band's own rows.
    pub fn collide_even(&mut self) {
        let rows = self.rows();
        collide(&self.current, &mut self.scratch, rows, self.width, Phase::Even);
    }

    /// Send the post-EVEN first row back and fill the ghost row from the successor.
    pub fn exchange_ghost(&mut self, endpoint: &Endpoint) -> Result<()> {
        let rows = self.rows();
        exchange_rows(
            endpoint,
            Direction::Backward,
            &mut self.scratch,
            self.width,
            0,
            rows,
        )
    }

    /// ODD collision pass over the ghost-augmented band.
    pub fn collide_odd(&mut self) {
        let rows = self.rows();
        let width = self.width;
        collide(
            &self.scratch[width..],
            &mut self.current[width..],
            rows,
            width,
            Phase::Odd,
        );
    }

    /// Pass the spill row forward and take row 0 from the predecessor, so
    /// the band is aligned for the next step without a round trip through
    /// the coordinator.
    pub fn realign(&mut self, endpoint: &Endpoint) -> Result<()> {
        let rows = self.rows();
        exchange_rows(
            endpoint,
            Direction::Forward,
            &mut self.current,
            self.width,
            rows,
            0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::grid::create_lattice;
    use crate::automaton::stepping::step_lattice;
    use crate::cluster::comm::world;

    #[test]
    fn test_buffers_sized_with_ghost_row() {
        let band = LocalBand::new(BandRange { count: 3, offset: 2 }, 8);
        assert_eq!(band.rows(), 6);
        assert_eq!(band.aligned().len(), 48);
        assert_eq!(band.shifted().len(), 48);
        assert_eq!(band.spill_row().len(), 8);
    }

    #[test]
    fn test_single_band_step_matches_serial() {
        // One worker owning the whole lattice: the ghost row is its own
        // first row and the spill row is lattice row 0.
        let mut lattice = create_lattice(6);
        lattice.set(1, 1, Cell::Gas);
        lattice.set(2, 4, Cell::Gas);
        lattice.set(5, 0, Cell::Gas);
        lattice.set(3, 3, Cell::Wall);

        let endpoint = world(1).pop().unwrap();
        let mut band = LocalBand::new(BandRange { count: 3, offset: 0 }, 6);
        band.rows_mut().copy_from_slice(&lattice.cells);

        band.collide_even();
        band.exchange_ghost(&endpoint).unwrap();
        band.collide_odd();

        let mut expected = lattice.clone();
        step_lattice(&mut expected);

        assert_eq!(band.spill_row(), expected.row(0));
        assert_eq!(&band.shifted()[..30], &expected.cells[6..]);

        band.realign(&endpoint).unwrap();
        assert_eq!(band.aligned(), &expected.cells[..]);
    }
}
