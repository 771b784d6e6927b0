//! Square matrix of cell markers.
//!
//! A `Grid` has no identity; boards build one on demand by overlaying their
//! boats and marks on an all-water matrix.

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::ship::BoatClass;

/// Errors returned by grid accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// Row or column index is out of bounds `[0..size)`.
    IndexOutOfBounds { row: usize, col: usize },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::IndexOutOfBounds { row, col } => {
                write!(f, "IndexOutOfBounds: row={}, col={}", row, col)
            }
        }
    }
}

/// Content of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Marker {
    /// Empty, or unknown on a tracking board.
    #[default]
    Water,
    /// Intact segment of a boat.
    Boat(BoatClass),
    /// Damaged boat segment.
    Hit,
    /// Attack that found nothing. Only ever on tracking boards.
    Miss,
}

impl Marker {
    /// `true` for cells that belong to a boat, damaged or not.
    pub fn is_boat(&self) -> bool {
        matches!(self, Marker::Boat(_) | Marker::Hit)
    }

    pub fn symbol(&self) -> char {
        match self {
            Marker::Water => '~',
            Marker::Boat(class) => class.letter(),
            Marker::Hit => 'X',
            Marker::Miss => 'o',
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A `size × size` matrix stored row-major.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    size: usize,
    cells: Vec<Marker>,
}

impl Grid {
    /// An all-water grid.
    pub fn new(size: usize) -> Self {
        Grid {
            size,
            cells: vec![Marker::Water; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> Result<usize, GridError> {
        if row >= self.size || col >= self.size {
            return Err(GridError::IndexOutOfBounds { row, col });
        }
        Ok(row * self.size + col)
    }

    pub fn get(&self, row: usize, col: usize) -> Result<Marker, GridError> {
        self.index(row, col).map(|i| self.cells[i])
    }

    pub fn set(&mut self, row: usize, col: usize, marker: Marker) -> Result<(), GridError> {
        let i = self.index(row, col)?;
        self.cells[i] = marker;
        Ok(())
    }

    /// Rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Marker]> {
        // chunks(0) panics; an empty grid simply has no rows
        self.cells.chunks(self.size.max(1))
    }

    /// Number of cells holding `marker`.
    pub fn count(&self, marker: Marker) -> usize {
        self.cells.iter().filter(|&&m| m == marker).count()
    }

    /// Plain string matrix for presentation.
    ///
    /// With `enumerated`, a header row and column of 1-based labels are
    /// prepended and the corner cell is left blank.
    pub fn to_labels(&self, enumerated: bool) -> Vec<Vec<String>> {
        let mut out: Vec<Vec<String>> = Vec::with_capacity(self.size + 1);
        if enumerated {
            let mut header = Vec::with_capacity(self.size + 1);
            header.push(String::new());
            header.extend((1..=self.size).map(|n| n.to_string()));
            out.push(header);
        }
        for (r, row) in self.rows().enumerate().take(self.size) {
            let mut line = Vec::with_capacity(self.size + 1);
            if enumerated {
                line.push((r + 1).to_string());
            }
            line.extend(row.iter().map(|m| m.symbol().to_string()));
            out.push(line);
        }
        out
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid {}x{}:", self.size, self.size)?;
        for row in self.rows().take(self.size) {
            for m in row {
                write!(f, "{}", m.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
