//! Distribution and reassembly of the canonical lattice.
//!
//! Rank 0 owns the `Lattice`. At the start of a step it scatters each
//! worker's rows; after the ODD pass it gathers them back. The ODD output
//! of every band is shifted down by one row, so the last band's final row
//! is lattice row 0. That row travels on its own (`Tag::WrapRow`) before
//! the bulk gather, which then fills rows `1..N`.

use tracing::debug;

use super::comm::{Endpoint, Tag};
use super::worker::LocalBand;
use crate::automaton::partition::Partition;
use crate::automaton::region::{extract_rows, import_rows};
use crate::error::Result;
use crate::state::Lattice;

pub struct Coordinator {
    lattice: Lattice,
    partition: Partition,
}

impl Coordinator {
    pub fn new(lattice: Lattice, partition: Partition) -> Coordinator {
        Coordinator { lattice, partition }
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn into_lattice(self) -> Lattice {
        self.lattice
    }

    /// Send every other rank its rows and copy rank 0's rows locally.
    pub fn scatter(&self, endpoint: &Endpoint, own: &mut LocalBand) -> Result<()> {
        let n = self.lattice.size;
        for rank in 1..endpoint.size() {
            let range = self.partition.band(rank);
            let start = range.first_row() * n;
            let end = start + range.rows() * n;
            endpoint.send(rank, Tag::Scatter, &self.lattice.cells[start..end])?;
        }

        let first_row = own.range().first_row() as i64;
        let rows = own.rows();
        let copied = extract_rows(&self.lattice, first_row, own.rows_mut());
        debug_assert_eq!(copied, rows, "band buffer is not {rows} whole rows");
        Ok(())
    }

    /// Reassemble the lattice from every band's ODD output and stamp it
    /// with `generation`.
    pub fn gather(&mut self, endpoint: &Endpoint, own: &LocalBand, generation: u64) -> Result<()> {
        let n = self.lattice.size;
        let last = endpoint.size() - 1;

        if last == 0 {
            import_rows(&mut self.lattice, 0, own.spill_row());
        } else {
            endpoint.recv_into(last, Tag::WrapRow, &mut self.lattice.cells[..n])?;
        }

        let own_rows = gathered_rows(own.rows(), last == 0);
        let first_row = own.range().first_row() as i64 + 1;
        let imported = import_rows(&mut self.lattice, first_row, &own.shifted()[..own_rows * n]);
        debug_assert_eq!(imported, own_rows);

        for rank in 1..endpoint.size() {
            let range = self.partition.band(rank);
            let rows = gathered_rows(range.rows(), rank == last);
            let start = (range.first_row() + 1) * n;
            let end = start + rows * n;
            endpoint.recv_into(rank, Tag::Gather, &mut self.lattice.cells[start..end])?;
        }

        self.lattice.generation = generation;
        debug!(generation, "lattice reassembled");
        Ok(())
    }
}

/// Rows a band contributes to the bulk gather. The last band's spill row
/// is lattice row 0 and arrives separately.
#[inline]
fn gathered_rows(rows: usize, is_last: bool) -> usize {
    if is_last {
        rows - 1
    } else {
        rows
    }
}

/// Worker side of the scatter.
pub fn receive_band(endpoint: &Endpoint, band: &mut LocalBand) -> Result<()> {
    endpoint.recv_into(0, Tag::Scatter, band.rows_mut())
}

/// Worker side of the gather. The last rank sends the wrap row first.
pub fn submit_band(endpoint: &Endpoint, band: &LocalBand) -> Result<()> {
    let rows = gathered_rows(band.rows(), endpoint.is_last());
    if endpoint.is_last() {
        endpoint.send(0, Tag::WrapRow, band.spill_row())?;
    }
    endpoint.send(0, Tag::Gather, &band.shifted()[..rows * band.width()])
}
