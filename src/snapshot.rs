//! PGM snapshots of the lattice.
//!
//! Each cell is one grey sample; WALL is black and EMPTY, the largest
//! code, is white.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::state::{Cell, Lattice};

/// Write `lattice` as a binary (P5) greymap.
pub fn write_pgm<W: Write>(mut out: W, lattice: &Lattice) -> Result<()> {
    let n = lattice.size;
    write!(out, "P5\n# produced by hpp\n{n} {n}\n{}\n", Cell::Empty as u8)?;
    out.write_all(&lattice.to_bytes())?;
    out.flush()?;
    Ok(())
}

/// `dir/hppNNNNN.pgm` for frame number `frame`.
pub fn snapshot_path(dir: &Path, frame: u64) -> PathBuf {
    dir.join(format!("hpp{frame:05}.pgm"))
}

/// Write a snapshot named after the lattice's generation.
pub fn write_snapshot(dir: &Path, lattice: &Lattice) -> Result<PathBuf> {
    let path = snapshot_path(dir, lattice.generation);
    let file = File::create(&path)?;
    write_pgm(BufWriter::new(file), lattice)?;
    debug!(path = %path.display(), generation = lattice.generation, "snapshot written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::grid::create_lattice;

    #[test]
    fn test_pgm_layout() {
        let mut lattice = create_lattice(2);
        lattice.set(0, 1, Cell::Wall);
        lattice.set(1, 0, Cell::Gas);

        let mut out = Vec::new();
        write_pgm(&mut out, &lattice).unwrap();

        let header = b"P5\n# produced by hpp\n2 2\n2\n";
        assert_eq!(&out[..header.len()], header);
        assert_eq!(&out[header.len()..], &[2, 0, 1, 2]);
    }

    #[test]
    fn test_snapshot_names() {
        let dir = Path::new("out");
        assert_eq!(snapshot_path(dir, 0), Path::new("out/hpp00000.pgm"));
        assert_eq!(snapshot_path(dir, 123), Path::new("out/hpp00123.pgm"));
    }

    #[test]
    fn test_write_snapshot_to_missing_dir_fails() {
        let lattice = create_lattice(2);
        assert!(write_snapshot(Path::new("/nonexistent/hpp-out"), &lattice).is_err());
    }
}
