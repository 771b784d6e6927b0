//! Boat classes, orientations and placed boats.

use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::common::{GameError, Position};
use crate::grid::Marker;

/// Orientation of a boat on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Parse `H`/`V`, case-insensitive.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'H' => Some(Orientation::Horizontal),
            'V' => Some(Orientation::Vertical),
            _ => None,
        }
    }

    /// Position of the `i`-th segment of a boat anchored at `anchor`.
    pub fn step(self, (row, col): Position, i: usize) -> Position {
        match self {
            Orientation::Horizontal => (row, col + i),
            Orientation::Vertical => (row + i, col),
        }
    }
}

/// The five boat classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum BoatClass {
    AircraftCarrier,
    Battleship,
    Frigate,
    Submarine,
    PatrolBoat,
}

impl BoatClass {
    /// Number of cells a boat of this class occupies.
    pub const fn length(self) -> usize {
        match self {
            BoatClass::AircraftCarrier => 5,
            BoatClass::Battleship => 4,
            BoatClass::Frigate => 3,
            BoatClass::Submarine => 3,
            BoatClass::PatrolBoat => 2,
        }
    }

    /// Marker letter of an intact segment.
    pub const fn letter(self) -> char {
        match self {
            BoatClass::AircraftCarrier => 'A',
            BoatClass::Battleship => 'B',
            BoatClass::Frigate => 'F',
            BoatClass::Submarine => 'S',
            BoatClass::PatrolBoat => 'P',
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            BoatClass::AircraftCarrier => "aircraft carrier",
            BoatClass::Battleship => "battleship",
            BoatClass::Frigate => "frigate",
            BoatClass::Submarine => "submarine",
            BoatClass::PatrolBoat => "patrol boat",
        }
    }

    /// Position in [`crate::config::CLASSES`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for BoatClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoatClass {
    type Err = GameError;

    /// Accepts the class name with spaces, underscores or dashes, or its
    /// single marker letter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: alloc::string::String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "aircraftcarrier" | "carrier" | "a" => Ok(BoatClass::AircraftCarrier),
            "battleship" | "b" => Ok(BoatClass::Battleship),
            "frigate" | "f" => Ok(BoatClass::Frigate),
            "submarine" | "s" => Ok(BoatClass::Submarine),
            "patrolboat" | "p" => Ok(BoatClass::PatrolBoat),
            _ => Err(GameError::UnknownBoatType(s.to_string())),
        }
    }
}

/// One coordinate of a board together with its marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub marker: Marker,
}

/// A placed boat. Segments are contiguous along one orientation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Boat {
    class: BoatClass,
    orientation: Orientation,
    cells: Vec<Cell>,
}

impl Boat {
    /// Lay out a boat from `anchor`. Bounds are the caller's concern.
    pub(crate) fn new(class: BoatClass, anchor: Position, orientation: Orientation) -> Self {
        let cells = (0..class.length())
            .map(|i| {
                let (row, col) = orientation.step(anchor, i);
                Cell {
                    row,
                    col,
                    marker: Marker::Boat(class),
                }
            })
            .collect();
        Boat {
            class,
            orientation,
            cells,
        }
    }

    pub fn class(&self) -> BoatClass {
        self.class
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// First segment of the boat.
    pub fn origin(&self) -> Position {
        self.cells.first().map(|c| (c.row, c.col)).unwrap_or_default()
    }

    pub fn occupies(&self, row: usize, col: usize) -> bool {
        self.cells.iter().any(|c| c.row == row && c.col == col)
    }

    /// Flip the segment at (`row`, `col`) to `Hit`.
    ///
    /// Returns `None` when the boat does not occupy the cell, otherwise
    /// whether the segment was intact before the call.
    pub(crate) fn mark_hit(&mut self, row: usize, col: usize) -> Option<bool> {
        let cell = self
            .cells
            .iter_mut()
            .find(|c| c.row == row && c.col == col)?;
        let fresh = cell.marker != Marker::Hit;
        cell.marker = Marker::Hit;
        Some(fresh)
    }

    /// Segments not yet hit.
    pub fn intact_segments(&self) -> usize {
        self.cells.iter().filter(|c| c.marker != Marker::Hit).count()
    }

    pub fn is_sunk(&self) -> bool {
        self.intact_segments() == 0
    }
}
