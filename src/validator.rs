//! Spacing-aware fleet placement validation.
//!
//! Checks run against the board's extended grid, where every real
//! coordinate is shifted by one. Row 0 and column 0 of that grid form a
//! water margin, so the band above and to the left of a boat can be scanned
//! without special-casing negative indices. The band below and to the right
//! is clamped to the last extended index.

use core::ops::RangeInclusive;

use crate::board::Board;
use crate::common::{GameError, PlacementError, Position};
use crate::grid::Grid;
use crate::ship::{BoatClass, Orientation};

/// Extended-grid rows and columns a boat and its one-cell buffer cover.
fn buffer_zone(
    (row, col): Position,
    orientation: Orientation,
    length: usize,
    extended_size: usize,
) -> (RangeInclusive<usize>, RangeInclusive<usize>) {
    let last = extended_size - 1;
    // In extended coordinates the boat starts at (row + 1, col + 1); its
    // buffer starts one cell earlier and ends one cell past its last segment.
    let (rows, cols) = match orientation {
        Orientation::Horizontal => (2, length + 1),
        Orientation::Vertical => (length + 1, 2),
    };
    (row..=(row + rows).min(last), col..=(col + cols).min(last))
}

/// Geometry check only; quota is the caller's precondition.
pub fn validate(
    board: &Board,
    anchor: Position,
    orientation: Orientation,
    class: BoatClass,
) -> Result<(), PlacementError> {
    let n = board.map_size();
    let (row, col) = anchor;
    let length = class.length();
    if row >= n || col >= n {
        return Err(PlacementError::OutOfBounds);
    }
    let tail = match orientation {
        Orientation::Horizontal => col + length - 1,
        Orientation::Vertical => row + length - 1,
    };
    if tail >= n {
        return Err(PlacementError::OutOfBounds);
    }

    let grid = board.grid(true);
    if zone_is_clear(&grid, anchor, orientation, length) {
        Ok(())
    } else {
        Err(PlacementError::TooClose)
    }
}

fn zone_is_clear(grid: &Grid, anchor: Position, orientation: Orientation, length: usize) -> bool {
    let (rows, cols) = buffer_zone(anchor, orientation, length, grid.size());
    for r in rows {
        for c in cols.clone() {
            if grid.get(r, c).map(|m| m.is_boat()).unwrap_or(false) {
                return false;
            }
        }
    }
    true
}

/// `true` when a boat of `class` fits at `anchor` with the mandatory gap.
pub fn is_placement_valid(
    board: &Board,
    anchor: Position,
    orientation: Orientation,
    class: BoatClass,
) -> bool {
    validate(board, anchor, orientation, class).is_ok()
}

/// Validate untyped input.
///
/// An unrecognised orientation is an ordinary rejection (`Ok(false)`), while
/// a boat type outside the class table is reported as
/// [`GameError::UnknownBoatType`].
pub fn check_raw(
    board: &Board,
    anchor: Position,
    orientation: char,
    boat_type: &str,
) -> Result<bool, GameError> {
    let class: BoatClass = boat_type.parse()?;
    Ok(match Orientation::from_char(orientation) {
        Some(o) => is_placement_valid(board, anchor, o, class),
        None => false,
    })
}
