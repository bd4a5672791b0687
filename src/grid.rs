use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Longest allowed side of the grid.
pub const MAX_GRID_SIDE: u32 = 12;
/// Largest allowed number of cards on the table (12×12).
pub const MAX_TOTAL_CARDS: u32 = 144;

/// Pure validity predicate for a `rows × cols` table.
pub fn is_valid_grid(rows: u32, cols: u32) -> bool {
    rows > 0
        && cols > 0
        && rows <= MAX_GRID_SIDE
        && cols <= MAX_GRID_SIDE
        && (rows * cols) % 2 == 0
        && rows * cols <= MAX_TOTAL_CARDS
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid must look like ROWSxCOLS (e.g. 4x4), got '{0}'")]
    Malformed(String),
    #[error("{rows}x{cols} is not playable: sides must be 1-12 with an even card count of at most 144")]
    Invalid { rows: u32, cols: u32 },
}

/// Cursor / adjustment direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A validated grid shape. Can only be built through [`GridDimension::new`]
/// or parsing, so every value satisfies [`is_valid_grid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridDimension {
    rows: u8,
    cols: u8,
}

impl GridDimension {
    pub fn new(rows: u32, cols: u32) -> Result<Self, GridError> {
        if !is_valid_grid(rows, cols) {
            return Err(GridError::Invalid { rows, cols });
        }
        // Both sides are <= 12 here, so they fit in a u8.
        Ok(GridDimension {
            rows: rows as u8,
            cols: cols as u8,
        })
    }

    const fn preset(rows: u8, cols: u8) -> Self {
        GridDimension { rows, cols }
    }

    pub fn rows(self) -> usize {
        usize::from(self.rows)
    }

    pub fn cols(self) -> usize {
        usize::from(self.cols)
    }

    pub fn cell_count(self) -> usize {
        self.rows() * self.cols()
    }

    pub fn pairs(self) -> usize {
        self.cell_count() / 2
    }

    /// Row-major `(row, col)` of a card index.
    pub fn position(self, index: usize) -> (usize, usize) {
        (index / self.cols(), index % self.cols())
    }

    /// Grow or shrink one side by one (up/down = rows, left/right = cols).
    /// Results that fail validation leave the dimension unchanged.
    pub fn adjust(self, direction: Direction) -> Self {
        let (mut rows, mut cols) = (u32::from(self.rows), u32::from(self.cols));
        match direction {
            Direction::Up => rows = (rows + 1).min(MAX_GRID_SIDE),
            Direction::Down => rows = rows.saturating_sub(1).max(1),
            Direction::Left => cols = cols.saturating_sub(1).max(1),
            Direction::Right => cols = (cols + 1).min(MAX_GRID_SIDE),
        }
        GridDimension::new(rows, cols).unwrap_or(self)
    }

    /// Move a cursor one step, clamped to the table.
    pub fn step(self, index: usize, direction: Direction) -> usize {
        let last = self.cell_count().saturating_sub(1);
        match direction {
            Direction::Left => index.saturating_sub(1),
            Direction::Right => (index + 1).min(last),
            Direction::Up => index.saturating_sub(self.cols()),
            Direction::Down => (index + self.cols()).min(last),
        }
    }
}

impl Default for GridDimension {
    fn default() -> Self {
        GridDimension::preset(4, 4)
    }
}

impl fmt::Display for GridDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

impl FromStr for GridDimension {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || GridError::Malformed(s.to_string());
        let (rows, cols) = s.split_once('x').ok_or_else(malformed)?;
        let is_number = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !is_number(rows) || !is_number(cols) {
            return Err(malformed());
        }
        // Absurdly long digit strings are simply out of range.
        let rows = rows.parse().unwrap_or(u32::MAX);
        let cols = cols.parse().unwrap_or(u32::MAX);
        GridDimension::new(rows, cols)
    }
}

/// Preset tables offered on the menu, smallest first.
pub const PRESETS: [GridDimension; 10] = [
    GridDimension::preset(2, 2),
    GridDimension::preset(2, 4),
    GridDimension::preset(2, 6),
    GridDimension::preset(4, 4),
    GridDimension::preset(3, 6),
    GridDimension::preset(3, 8),
    GridDimension::preset(6, 6),
    GridDimension::preset(8, 8),
    GridDimension::preset(10, 10),
    GridDimension::preset(12, 12),
];

pub fn preset_index(dim: GridDimension) -> Option<usize> {
    PRESETS.iter().position(|&p| p == dim)
}

/// How much room each card gets on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSize {
    Simple,
    Minimal,
    Mini,
    Micro,
}

impl CardSize {
    pub fn for_grid(dim: GridDimension) -> Self {
        let cells = dim.cell_count();
        let longest = dim.rows().max(dim.cols());
        if cells >= 72 || longest >= 12 {
            CardSize::Micro
        } else if cells >= 32 || longest >= 8 {
            CardSize::Mini
        } else if cells <= 8 {
            CardSize::Simple
        } else {
            CardSize::Minimal
        }
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;

    quickcheck! {
        fn valid_grids_are_even_and_bounded(rows: u8, cols: u8) -> bool {
            let (rows, cols) = (u32::from(rows) % 16, u32::from(cols) % 16);
            match GridDimension::new(rows, cols) {
                Ok(dim) => {
                    dim.cell_count() % 2 == 0
                        && dim.cell_count() <= 144
                        && dim.rows() >= 1
                        && dim.cols() >= 1
                }
                Err(_) => {
                    rows == 0 || cols == 0 || rows > 12 || cols > 12 || (rows * cols) % 2 == 1
                }
            }
        }
    }

    #[test]
    fn each_violation_is_rejected() {
        assert!(!is_valid_grid(0, 4));
        assert!(!is_valid_grid(4, 0));
        assert!(!is_valid_grid(13, 2));
        assert!(!is_valid_grid(2, 13));
        assert!(!is_valid_grid(3, 3));
        assert!(!is_valid_grid(14, 12));
        assert!(is_valid_grid(12, 12));
        assert!(is_valid_grid(1, 2));
    }

    #[test]
    fn parses_rows_by_cols() {
        assert_eq!("4x4".parse::<GridDimension>(), GridDimension::new(4, 4));
        assert_eq!("2x6".parse::<GridDimension>().unwrap().to_string(), "2x6");
        assert_eq!(
            "3x3".parse::<GridDimension>(),
            Err(GridError::Invalid { rows: 3, cols: 3 })
        );
        assert!(matches!("13x2".parse::<GridDimension>(), Err(GridError::Invalid { .. })));
        for bad in ["4X4", "x4", "4x", "4x4x", " 4x4", "-2x2", "ax4", ""] {
            assert!(
                matches!(bad.parse::<GridDimension>(), Err(GridError::Malformed(_))),
                "{bad:?} should be malformed"
            );
        }
        assert!("99999999999x2".parse::<GridDimension>().is_err());
    }

    #[test]
    fn adjust_keeps_previous_value_when_invalid() {
        let dim = GridDimension::new(4, 4).unwrap();
        assert_eq!(dim.adjust(Direction::Up), GridDimension::new(5, 4).unwrap());
        let odd = GridDimension::new(3, 4).unwrap();
        assert_eq!(odd.adjust(Direction::Left), odd, "3x3 is odd");
        let top = GridDimension::new(12, 12).unwrap();
        assert_eq!(top.adjust(Direction::Up), top);
        assert_eq!(top.adjust(Direction::Right), top);
        let thin = GridDimension::new(1, 2).unwrap();
        assert_eq!(thin.adjust(Direction::Down), thin);
    }

    #[test]
    fn cursor_steps_stay_on_the_table() {
        let dim = GridDimension::new(2, 4).unwrap();
        assert_eq!(dim.step(0, Direction::Left), 0);
        assert_eq!(dim.step(0, Direction::Down), 4);
        assert_eq!(dim.step(5, Direction::Up), 1);
        assert_eq!(dim.step(6, Direction::Down), 7);
        assert_eq!(dim.step(7, Direction::Right), 7);
        assert_eq!(dim.position(6), (1, 2));
    }

    #[test]
    fn presets_are_valid_and_sorted() {
        assert!(
            PRESETS
                .iter()
                .all(|p| is_valid_grid(p.rows() as u32, p.cols() as u32))
        );
        assert!(PRESETS.windows(2).all(|w| w[0].cell_count() < w[1].cell_count()));
        assert_eq!(preset_index(GridDimension::default()), Some(3));
    }

    #[test]
    fn card_size_follows_density() {
        let size = |r, c| CardSize::for_grid(GridDimension::new(r, c).unwrap());
        assert_eq!(size(2, 2), CardSize::Simple);
        assert_eq!(size(4, 4), CardSize::Minimal);
        assert_eq!(size(8, 2), CardSize::Mini);
        assert_eq!(size(6, 6), CardSize::Mini);
        assert_eq!(size(12, 2), CardSize::Micro);
        assert_eq!(size(10, 10), CardSize::Micro);
    }
}
