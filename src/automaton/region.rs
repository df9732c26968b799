//! Row-range extraction and import operations.
//!
//! Scatter and gather move whole rows between the lattice and worker
//! bands; these helpers do the copying and the vertical wrap.

use super::grid::wrap;
use crate::state::{Cell, Lattice};

/// Copy `out_buf.len() / size` consecutive rows starting at `first_row`
/// into `out_buf`, wrapping past the last row.
///
/// # Returns
/// Number of rows copied. A buffer that is not a whole number of rows
/// copies nothing.
pub fn extract_rows(lattice: &Lattice, first_row: i64, out_buf: &mut [Cell]) -> usize {
    let n = lattice.size;
    if n == 0 || out_buf.len() % n != 0 {
        return 0;
    }

    let rows = out_buf.len() / n;
    for (k, chunk) in out_buf.chunks_exact_mut(n).enumerate() {
        let row = wrap(first_row + k as i64, n);
        chunk.copy_from_slice(lattice.row(row));
    }

    rows
}

/// Write the rows held in `in_buf` into the lattice starting at
/// `first_row`, wrapping past the last row.
///
/// # Returns
/// Number of rows written, or 0 if `in_buf` is not a whole number of rows.
pub fn import_rows(lattice: &mut Lattice, first_row: i64, in_buf: &[Cell]) -> usize {
    let n = lattice.size;
    if n == 0 || in_buf.len() % n != 0 {
        return 0;
    }

    let rows = in_buf.len() / n;
    for (k, chunk) in in_buf.chunks_exact(n).enumerate() {
        let row = wrap(first_row + k as i64, n);
        lattice.cells[row * n..(row + 1) * n].copy_from_slice(chunk);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::grid::create_lattice;

    fn striped(size: usize) -> Lattice {
        let mut lattice = create_lattice(size);
        for row in 0..size {
            let cell = if row % 2 == 0 { Cell::Gas } else { Cell::Wall };
            for col in 0..size {
                lattice.set(row as i64, col as i64, cell);
            }
        }
        lattice.set(0, 0, Cell::Empty);
        lattice
    }

    #[test]
    fn test_extract_rows() {
        let lattice = striped(4);
        let mut out = vec![Cell::Empty; 8];
        assert_eq!(extract_rows(&lattice, 1, &mut out), 2);
        assert_eq!(&out[..4], &[Cell::Wall; 4]);
        assert_eq!(&out[4..], &[Cell::Gas; 4]);
    }

    #[test]
    fn test_extract_rows_wraps() {
        let lattice = striped(4);
        let mut out = vec![Cell::Gas; 8];
        assert_eq!(extract_rows(&lattice, 3, &mut out), 2);
        assert_eq!(&out[..4], &[Cell::Wall; 4]);
        assert_eq!(out[4], Cell::Empty);
        assert_eq!(&out[5..], &[Cell::Gas; 3]);
    }

    #[test]
    fn test_partial_row_rejected() {
        let mut lattice = striped(4);
        let before = lattice.clone();
        let mut out = vec![Cell::Empty; 5];
        assert_eq!(extract_rows(&lattice, 0, &mut out), 0);
        assert_eq!(import_rows(&mut lattice, 0, &out), 0);
        assert_eq!(lattice, before);
    }

    #[test]
    fn test_import_extract_symmetry() {
        let source = striped(6);
        let mut target = create_lattice(6);

        let mut buf = vec![Cell::Empty; 6 * 6];
        extract_rows(&source, -2, &mut buf);
        assert_eq!(import_rows(&mut target, -2, &buf), 6);
        assert_eq!(target, source);
    }
}
