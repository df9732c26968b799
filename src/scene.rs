//! Scene files: the textual description of the initial lattice.
//!
//! A scene is a sequence of whitespace-separated directives:
//!
//! ```text
//! c x y r t            circle of cell type t
//! b x1 y1 x2 y2 t      box of cell type t
//! r x1 y1 x2 y2 p      GAS with probability p on EMPTY cells of a box
//! ```
//!
//! Coordinates are fractions of the lattice side with `y = 0` at the
//! bottom. Cell types are the codes of [`Cell`].

use std::fs;
use std::path::Path;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::automaton::grid::create_lattice;
use crate::error::{HppError, Result};
use crate::state::{Cell, Lattice};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Directive {
    Circle {
        x: f32,
        y: f32,
        r: f32,
        cell: Cell,
    },
    Box {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        cell: Cell,
    },
    RandomFill {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        p: f32,
    },
}

/// Whitespace tokens tagged with their 1-based line number.
struct Tokens<'a> {
    inner: Box<dyn Iterator<Item = (usize, &'a str)> + 'a>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Tokens<'a> {
        let inner = text
            .lines()
            .enumerate()
            .flat_map(|(n, line)| line.split_whitespace().map(move |tok| (n + 1, tok)));
        Tokens {
            inner: Box::new(inner),
        }
    }

    fn next_token(&mut self) -> Option<(usize, &'a str)> {
        self.inner.next()
    }

    /// Parse the next argument of `directive`, which started on `line`.
    fn arg<T: FromStr>(&mut self, directive: char, line: usize) -> Result<T> {
        let (at, tok) = self.next_token().ok_or_else(|| HppError::MalformedDirective {
            directive,
            line,
            reason: "unexpected end of file".to_string(),
        })?;
        tok.parse().map_err(|_| HppError::MalformedDirective {
            directive,
            line: at,
            reason: format!("`{tok}` is not a number"),
        })
    }

    /// A coordinate or probability; infinities and NaN are rejected.
    fn real(&mut self, directive: char, line: usize) -> Result<f32> {
        let value: f32 = self.arg(directive, line)?;
        if !value.is_finite() {
            return Err(HppError::MalformedDirective {
                directive,
                line,
                reason: format!("`{value}` is not a finite number"),
            });
        }
        Ok(value)
    }

    fn cell(&mut self, directive: char, line: usize) -> Result<Cell> {
        let code: i64 = self.arg(directive, line)?;
        Cell::from_code(code).ok_or(HppError::InvalidCellCode { code, line })
    }
}

/// Parse scene text into directives, in file order.
pub fn parse_scene(text: &str) -> Result<Vec<Directive>> {
    let mut tokens = Tokens::new(text);
    let mut directives = Vec::new();

    while let Some((line, tok)) = tokens.next_token() {
        let directive = match tok {
            "c" => Directive::Circle {
                x: tokens.real('c', line)?,
                y: tokens.real('c', line)?,
                r: tokens.real('c', line)?,
                cell: tokens.cell('c', line)?,
            },
            "b" => Directive::Box {
                x1: tokens.real('b', line)?,
                y1: tokens.real('b', line)?,
                x2: tokens.real('b', line)?,
                y2: tokens.real('b', line)?,
                cell: tokens.cell('b', line)?,
            },
            "r" => Directive::RandomFill {
                x1: tokens.real('r', line)?,
                y1: tokens.real('r', line)?,
                x2: tokens.real('r', line)?,
                y2: tokens.real('r', line)?,
                p: tokens.real('r', line)?,
            },
            other => {
                return Err(HppError::UnknownDirective {
                    token: other.to_string(),
                    line,
                })
            }
        };
        directives.push(directive);
    }

    Ok(directives)
}

/// Scale a fractional coordinate to a lattice index.
#[inline]
fn scale(v: f32, n: usize) -> i64 {
    (v * n as f32).ceil() as i64
}

/// Lattice row of scene row `iy`; scene rows count up from the bottom.
#[inline]
fn flip(iy: i64, n: usize) -> i64 {
    n as i64 - 1 - iy
}

/// Inclusive index range from `lo` to `hi`, starting inside `[0, n)` and
/// at most one lap of the torus long. A full `[0, 1]` side is `n + 1`
/// indices whose last one wraps onto the first.
fn span(lo: i64, hi: i64, n: usize) -> (i64, i64) {
    let n = n as i64;
    let start = lo.rem_euclid(n);
    (start, start + hi.saturating_sub(lo).min(n))
}

/// Inclusive index bounds `(ix1, ix2, iy1, iy2)` of a fractional rectangle.
fn bounds(x1: f32, y1: f32, x2: f32, y2: f32, n: usize) -> (i64, i64, i64, i64) {
    let (ix1, ix2) = span(scale(x1.min(x2), n), scale(x1.max(x2), n), n);
    let (iy1, iy2) = span(scale(y1.min(y2), n), scale(y1.max(y2), n), n);
    (ix1, ix2, iy1, iy2)
}

/// Draw one directive onto the lattice.
pub fn apply(lattice: &mut Lattice, directive: &Directive, rng: &mut StdRng) {
    let n = lattice.size;
    match *directive {
        Directive::Circle { x, y, r, cell } => {
            let side = n as i64;
            let (ix, iy) = (scale(x, n).rem_euclid(side), scale(y, n).rem_euclid(side));
            // A radius of n already covers the whole torus.
            let ir = scale(r, n).min(side);
            for dy in -ir..=ir {
                for dx in -ir..=ir {
                    if dx * dx + dy * dy <= ir * ir {
                        lattice.set(flip(iy + dy, n), ix + dx, cell);
                    }
                }
            }
        }
        Directive::Box {
            x1,
            y1,
            x2,
            y2,
            cell,
        } => {
            let (ix1, ix2, iy1, iy2) = bounds(x1, y1, x2, y2, n);
            for i in iy1..=iy2 {
                for j in ix1..=ix2 {
                    lattice.set(flip(i, n), j, cell);
                }
            }
        }
        Directive::RandomFill { x1, y1, x2, y2, p } => {
            let (ix1, ix2, iy1, iy2) = bounds(x1, y1, x2, y2, n);
            for i in iy1..=iy2 {
                for j in ix1..=ix2 {
                    let row = flip(i, n);
                    if lattice.get(row, j).is_empty() && rng.gen::<f32>() < p {
                        lattice.set(row, j, Cell::Gas);
                    }
                }
            }
        }
    }
}

/// Build the initial lattice: all EMPTY, then every directive in order.
pub fn build_lattice(directives: &[Directive], size: usize, seed: u64) -> Lattice {
    let mut lattice = create_lattice(size);
    let mut rng = StdRng::seed_from_u64(seed);
    for directive in directives {
        apply(&mut lattice, directive, &mut rng);
    }
    lattice
}

/// Read and draw a scene file.
pub fn read_scene(path: &Path, size: usize, seed: u64) -> Result<Lattice> {
    let text = fs::read_to_string(path).map_err(|source| HppError::SceneOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let directives = parse_scene(&text)?;
    debug!(path = %path.display(), directives = directives.len(), "scene parsed");
    Ok(build_lattice(&directives, size, seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::grid::census;

    #[test]
    fn test_parse_all_directives() {
        let text = "c 0.5 0.5 0.1 0\nb 0 0\n 1 0.25 1\nr 0.1 0.2 0.3 0.4 0.5\n";
        let directives = parse_scene(text).unwrap();
        assert_eq!(
            directives,
            vec![
                Directive::Circle {
                    x: 0.5,
                    y: 0.5,
                    r: 0.1,
                    cell: Cell::Wall
                },
                Directive::Box {
                    x1: 0.0,
                    y1: 0.0,
                    x2: 1.0,
                    y2: 0.25,
                    cell: Cell::Gas
                },
                Directive::RandomFill {
                    x1: 0.1,
                    y1: 0.2,
                    x2: 0.3,
                    y2: 0.4,
                    p: 0.5
                },
            ]
        );
        assert!(parse_scene("  \n\n").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_directive_reports_line() {
        let err = parse_scene("b 0 0 1 1 2\n\nx 1 2 3\n").unwrap_err();
        assert!(matches!(
            err,
            HppError::UnknownDirective { ref token, line: 3 } if token == "x"
        ));
    }

    #[test]
    fn test_malformed_arguments() {
        assert!(matches!(
            parse_scene("c 0.5 0.5"),
            Err(HppError::MalformedDirective {
                directive: 'c',
                line: 1,
                ..
            })
        ));
        assert!(matches!(
            parse_scene("b 0 0\n1 oops 1"),
            Err(HppError::MalformedDirective {
                directive: 'b',
                line: 2,
                ..
            })
        ));
        assert!(matches!(
            parse_scene("b 0 0 1 1 7"),
            Err(HppError::InvalidCellCode { code: 7, line: 1 })
        ));
    }

    #[test]
    fn test_box_is_inclusive_and_bottom_up() {
        // Scene rows 0..=1 are lattice rows 7 and 6.
        let directives = parse_scene("b 0 0 0.125 0.125 0").unwrap();
        let lattice = build_lattice(&directives, 8, 1);

        for (row, col) in [(7, 0), (7, 1), (6, 0), (6, 1)] {
            assert_eq!(lattice.get(row, col), Cell::Wall, "({row}, {col})");
        }
        assert_eq!(census(&lattice), (0, 60, 4));
    }

    #[test]
    fn test_box_uses_lower_y_corner() {
        // Corners given top first.
        let directives = parse_scene("b 0 0.25 0 0 1").unwrap();
        let lattice = build_lattice(&directives, 8, 1);
        assert_eq!(census(&lattice).0, 3);
        for row in [7, 6, 5] {
            assert_eq!(lattice.get(row, 0), Cell::Gas);
        }
    }

    #[test]
    fn test_circle_wraps() {
        // Radius one cell around the bottom-left corner.
        let directives = parse_scene("c 0 0 0.125 0").unwrap();
        let lattice = build_lattice(&directives, 8, 1);

        assert_eq!(census(&lattice).2, 5);
        assert_eq!(lattice.get(7, 0), Cell::Wall);
        assert_eq!(lattice.get(6, 0), Cell::Wall);
        assert_eq!(lattice.get(0, 0), Cell::Wall);
        assert_eq!(lattice.get(7, 1), Cell::Wall);
        assert_eq!(lattice.get(7, 7), Cell::Wall);
    }

    #[test]
    fn test_random_fill_only_touches_empty() {
        let directives = parse_scene("b 0 0 1 1 0\nb 0.5 0 1 1 2\nr 0 0 1 1 1.0").unwrap();
        let lattice = build_lattice(&directives, 8, 1);
        let (gas, empty, wall) = census(&lattice);

        assert_eq!(empty, 0);
        assert_eq!(gas + wall, 64);
        assert!(wall > 0 && gas > 0);
    }

    #[test]
    fn test_random_fill_is_seeded() {
        let directives = parse_scene("r 0 0 1 1 0.3").unwrap();
        let a = build_lattice(&directives, 16, 1234);
        let b = build_lattice(&directives, 16, 1234);
        let c = build_lattice(&directives, 16, 99);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(census(&a).2, 0);
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        for text in ["b 0 0 inf 1 0", "b nan 0 1 1 0", "c 0.5 0.5 -inf 1", "r 0 0 1 1 NaN"] {
            assert!(
                matches!(parse_scene(text), Err(HppError::MalformedDirective { line: 1, .. })),
                "accepted {text:?}"
            );
        }
    }

    #[test]
    fn test_huge_circle_covers_lattice() {
        let directives = parse_scene("c 0.5 0.5 1e12 0").unwrap();
        let lattice = build_lattice(&directives, 8, 1);
        assert_eq!(census(&lattice), (0, 0, 64));
    }

    #[test]
    fn test_huge_box_is_one_lap() {
        let directives = parse_scene("b -1e30 0 1e30 1 0\nc 1e30 -1e30 0 0").unwrap();
        let lattice = build_lattice(&directives, 8, 1);
        assert_eq!(census(&lattice), (0, 0, 64));
    }

    #[test]
    fn test_span_is_at_most_one_lap() {
        // One lap plus the wrapped index, as for a unit box.
        assert_eq!(span(0, 8, 8), (0, 8));
        assert_eq!(span(-3, 2, 8), (5, 10));
        assert_eq!(span(i64::MIN, i64::MAX, 8), (0, 8));
    }

    #[test]
    fn test_read_scene_missing_file() {
        let err = read_scene(Path::new("/nonexistent/hpp.scene"), 8, 1).unwrap_err();
        assert!(matches!(err, HppError::SceneOpen { .. }));
    }
}
