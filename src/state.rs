//! Core lattice structure and helper methods.

/// The state of one lattice site, stored as a single byte.
///
/// The discriminants double as the scene-file cell codes and as the grey
/// levels written to snapshots, so they must not be reordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Cell {
    Wall = 0,
    Gas = 1,
    Empty = 2,
}

impl Cell {
    /// Decode a scene-file cell code.
    pub fn from_code(code: i64) -> Option<Cell> {
        match code {
            0 => Some(Cell::Wall),
            1 => Some(Cell::Gas),
            2 => Some(Cell::Empty),
            _ => None,
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    #[inline]
    pub fn is_wall(self) -> bool {
        self == Cell::Wall
    }
}

/// The canonical N×N toroidal grid owned by the coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lattice {
    pub size: usize,
    pub cells: Vec<Cell>, // row-major, row 0 first
    pub generation: u64,
}

impl Lattice {
    /// Get the linear index for a (row, column) pair, wrapping both axes.
    #[inline]
    pub fn index(&self, row: i64, col: i64) -> usize {
        let n = self.size as i64;
        let row = ((row % n) + n) % n;
        let col = ((col % n) + n) % n;
        row as usize * self.size + col as usize
    }

    #[inline]
    pub fn get(&self, row: i64, col: i64) -> Cell {
        self.cells[self.index(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: i64, col: i64, cell: Cell) {
        let idx = self.index(row, col);
        self.cells[idx] = cell;
    }

    /// Borrow one full row. `row` must already be in `[0, size)`.
    #[inline]
    pub fn row(&self, row: usize) -> &[Cell] {
        &self.cells[row * self.size..(row + 1) * self.size]
    }

    /// Raw cell bytes in row-major order.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cells.iter().map(|&c| c as u8).collect()
    }
}
