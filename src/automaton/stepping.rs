//! HPP block collisions on the Margolus neighbourhood.
//!
//! Each pass scans 2×2 blocks anchored at even rows and columns. Inside a
//! block the cells are labelled
//!
//! ```text
//! EVEN: a b      ODD: d c
//!       c d           b a
//! ```
//!
//! where the ODD block sits one row below and one column left of the EVEN
//! block, so alternating passes never share a block boundary.

use super::grid::band_index;
use crate::state::{Cell, Lattice};

/// Which block alignment a collision pass uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Even,
    Odd,
}

/// Swap two cells unless either is a WALL.
#[inline]
fn swap_cells(cells: &mut [Cell], a: usize, b: usize) {
    if !cells[a].is_wall() && !cells[b].is_wall() {
        cells.swap(a, b);
    }
}

/// Copy one block from `source` to `dest` and apply the collision rule there.
#[inline]
fn collide_block(source: &[Cell], dest: &mut [Cell], [a, b, c, d]: [usize; 4]) {
    dest[a] = source[a];
    dest[b] = source[b];
    dest[c] = source[c];
    dest[d] = source[d];

    let empty_mismatch = (dest[a].is_empty() != dest[b].is_empty())
        && (dest[c].is_empty() != dest[d].is_empty());
    let touches_wall =
        dest[a].is_wall() || dest[b].is_wall() || dest[c].is_wall() || dest[d].is_wall();

    if empty_mismatch || touches_wall {
        swap_cells(dest, a, b);
        swap_cells(dest, c, d);
    } else {
        swap_cells(dest, a, d);
        swap_cells(dest, b, c);
    }
}

/// Block positions for the block anchored at `(i, j)` inside a band.
#[inline]
fn block_at(i: usize, j: usize, width: usize, phase: Phase) -> [usize; 4] {
    let j = j as i64;
    match phase {
        Phase::Even => [
            band_index(i, j, width),
            band_index(i, j + 1, width),
            band_index(i + 1, j, width),
            band_index(i + 1, j + 1, width),
        ],
        Phase::Odd => [
            band_index(i + 1, j, width),
            band_index(i + 1, j - 1, width),
            band_index(i, j, width),
            band_index(i, j - 1, width),
        ],
    }
}

/// Compute the next `rows × width` band from `source` into `dest`.
///
/// `rows` must be even and both slices must hold at least `rows * width`
/// cells. Every cell of `dest[..rows * width]` is written. Row indices do
/// not wrap; columns do.
pub fn collide(source: &[Cell], dest: &mut [Cell], rows: usize, width: usize, phase: Phase) {
    debug_assert!(rows % 2 == 0 && width % 2 == 0);
    debug_assert!(source.len() >= rows * width && dest.len() >= rows * width);

    for i in (0..rows).step_by(2) {
        for j in (0..width).step_by(2) {
            collide_block(source, dest, block_at(i, j, width, phase));
        }
    }
}

/// Advance a whole lattice by one step in a single address space.
///
/// EVEN pass over blocks anchored at even rows, then ODD pass over blocks
/// anchored at odd rows, wrapping from the last row to row 0. This is the
/// reference the distributed engine must reproduce cell for cell.
pub fn step_lattice(lattice: &mut Lattice) {
    if lattice.cells.is_empty() {
        return;
    }

    let n = lattice.size;
    let mut next = vec![Cell::Empty; lattice.cells.len()];
    collide(&lattice.cells, &mut next, n, n, Phase::Even);

    for i in (1..n as i64).step_by(2) {
        for j in (0..n as i64).step_by(2) {
            let block = [
                lattice.index(i + 1, j),
                lattice.index(i + 1, j - 1),
                lattice.index(i, j),
                lattice.index(i, j - 1),
            ];
            collide_block(&next, &mut lattice.cells, block);
        }
    }

    lattice.generation += 1;
}
