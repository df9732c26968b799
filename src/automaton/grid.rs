//! Lattice initialization and toroidal index helpers.

use crate::state::{Cell, Lattice};

/// Initialize an all-EMPTY lattice with the given side length.
pub fn create_lattice(size: usize) -> Lattice {
    Lattice {
        size,
        cells: vec![Cell::Empty; size * size],
        generation: 0,
    }
}

/// Normalize a possibly negative coordinate into `[0, n)`.
#[inline]
pub fn wrap(i: i64, n: usize) -> usize {
    let n = n as i64;
    (((i % n) + n) % n) as usize
}

/// Linear index of `(row, col)` in a buffer `width` cells wide.
///
/// Only the column wraps: rows inside a band are never wrapped, the ghost
/// row supplies the neighbour below the band instead.
#[inline]
pub fn band_index(row: usize, col: i64, width: usize) -> usize {
    row * width + wrap(col, width)
}

/// Population of (GAS, EMPTY, WALL) cells.
pub fn census(lattice: &Lattice) -> (usize, usize, usize) {
    let mut gas = 0;
    let mut empty = 0;
    let mut wall = 0;
    for &cell in &lattice.cells {
        match cell {
            Cell::Gas => gas += 1,
            Cell::Empty => empty += 1,
            Cell::Wall => wall += 1,
        }
    }
    (gas, empty, wall)
}
