//! Fleet and tracking boards.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use rand::Rng;

use crate::common::{AttackOutcome, GameError, PlacementError, PlayerId, Position};
use crate::config::{FleetQuota, CLASSES};
use crate::grid::{Grid, Marker};
use crate::ship::{Boat, BoatClass, Orientation};
use crate::validator;

/// Random anchors tried before falling back to a full scan.
const RANDOM_ATTEMPTS: usize = 100;

/// Role of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum BoardKind {
    /// The owner's own boats and the damage they have taken.
    Fleet,
    /// What the owner has learned about `victim`'s fleet.
    Tracking { victim: PlayerId },
}

/// One grid's worth of boats and marks for an (owner, target) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    owner: PlayerId,
    kind: BoardKind,
    map_size: usize,
    boats: Vec<Boat>,
    marks: BTreeMap<Position, Marker>,
}

impl Board {
    /// An empty fleet board for `owner`.
    pub fn fleet(owner: PlayerId, map_size: usize) -> Self {
        Self::with_kind(owner, BoardKind::Fleet, map_size)
    }

    /// An all-water tracking board for `owner`'s attacks on `victim`.
    pub fn tracking(owner: PlayerId, victim: PlayerId, map_size: usize) -> Self {
        Self::with_kind(owner, BoardKind::Tracking { victim }, map_size)
    }

    fn with_kind(owner: PlayerId, kind: BoardKind, map_size: usize) -> Self {
        Board {
            owner,
            kind,
            map_size,
            boats: Vec::new(),
            marks: BTreeMap::new(),
        }
    }

    pub fn owner(&self) -> PlayerId {
        self.owner
    }

    pub fn kind(&self) -> BoardKind {
        self.kind
    }

    pub fn is_fleet(&self) -> bool {
        self.kind == BoardKind::Fleet
    }

    pub fn map_size(&self) -> usize {
        self.map_size
    }

    pub fn boats(&self) -> &[Boat] {
        &self.boats
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<(), GameError> {
        if row >= self.map_size || col >= self.map_size {
            return Err(GameError::OutOfBounds { row, col });
        }
        Ok(())
    }

    /// Overlay boats and marks on an all-water matrix.
    ///
    /// With `extended`, the matrix gains one row and column and every real
    /// coordinate is shifted by one, leaving row 0 and column 0 as water.
    pub fn grid(&self, extended: bool) -> Grid {
        let shift = usize::from(extended);
        let mut grid = Grid::new(self.map_size + shift);
        let cells = self
            .boats
            .iter()
            .flat_map(|b| b.cells().iter().map(|c| ((c.row, c.col), c.marker)));
        let marks = self.marks.iter().map(|(&pos, &m)| (pos, m));
        for ((row, col), marker) in cells.chain(marks) {
            // cells are bounds-checked on insertion
            let _ = grid.set(row + shift, col + shift, marker);
        }
        grid
    }

    /// String matrix of the board, optionally with coordinate labels.
    pub fn render(&self, extended: bool, enumerated: bool) -> Vec<Vec<String>> {
        self.grid(extended).to_labels(enumerated)
    }

    /// Marker at (`row`, `col`) without rendering the whole board.
    pub fn occupancy_at(&self, row: usize, col: usize) -> Result<Marker, GameError> {
        self.check_bounds(row, col)?;
        if let Some(m) = self.marks.get(&(row, col)) {
            return Ok(*m);
        }
        Ok(self
            .boats
            .iter()
            .flat_map(|b| b.cells())
            .find(|c| c.row == row && c.col == col)
            .map(|c| c.marker)
            .unwrap_or(Marker::Water))
    }

    /// Boat occupying (`row`, `col`), if any.
    pub fn boat_at(&self, row: usize, col: usize) -> Option<&Boat> {
        self.boats.iter().find(|b| b.occupies(row, col))
    }

    /// Boats of `class` already placed.
    pub fn fleet_count(&self, class: BoatClass) -> usize {
        self.boats.iter().filter(|b| b.class() == class).count()
    }

    /// Whether another boat of `class` fits in `quota`.
    pub fn can_add(&self, class: BoatClass, quota: &FleetQuota) -> bool {
        self.fleet_count(class) < quota.get(class)
    }

    /// Whether any class still has quota left.
    pub fn any_boat_available(&self, quota: &FleetQuota) -> bool {
        CLASSES.iter().any(|&c| self.can_add(c, quota))
    }

    /// Classes that may still be placed, in table order.
    pub fn available_classes(&self, quota: &FleetQuota) -> Vec<BoatClass> {
        CLASSES
            .iter()
            .copied()
            .filter(|&c| self.can_add(c, quota))
            .collect()
    }

    /// Place a boat after checking quota and geometry. Nothing changes on
    /// failure.
    pub fn place(
        &mut self,
        class: BoatClass,
        anchor: Position,
        orientation: Orientation,
        quota: &FleetQuota,
    ) -> Result<&Boat, GameError> {
        if !self.is_fleet() {
            return Err(PlacementError::NotAFleetBoard.into());
        }
        if !self.can_add(class, quota) {
            return Err(PlacementError::QuotaExceeded(class).into());
        }
        validator::validate(self, anchor, orientation, class)?;
        self.boats.push(Boat::new(class, anchor, orientation));
        self.boats
            .last()
            .ok_or(GameError::Invariant("boat vanished after placement"))
    }

    /// Damage the boat segment at (`row`, `col`) on a fleet board.
    ///
    /// Fails when no boat occupies the cell: fleet boards never record misses.
    pub fn mark_hit(&mut self, row: usize, col: usize) -> Result<AttackOutcome, GameError> {
        self.check_bounds(row, col)?;
        if !self.is_fleet() {
            return self.record(row, col, Marker::Hit).map(|()| AttackOutcome::Hit);
        }
        let boat = self
            .boats
            .iter_mut()
            .find(|b| b.occupies(row, col))
            .ok_or(GameError::Invariant("hit marked on a cell without a boat"))?;
        match boat.mark_hit(row, col) {
            Some(false) => Ok(AttackOutcome::AlreadyHit),
            Some(true) if boat.is_sunk() => Ok(AttackOutcome::Sunk(boat.class())),
            Some(true) => Ok(AttackOutcome::Hit),
            None => Err(GameError::Invariant("boat does not own the matched cell")),
        }
    }

    /// Create or update a tracking mark. Only `Hit` and `Miss` are accepted,
    /// and a revealed hit is never downgraded.
    pub fn record(&mut self, row: usize, col: usize, marker: Marker) -> Result<(), GameError> {
        self.check_bounds(row, col)?;
        if self.is_fleet() {
            return Err(GameError::Invariant("tracking mark on a fleet board"));
        }
        if !matches!(marker, Marker::Hit | Marker::Miss) {
            return Err(GameError::Invariant("tracking boards hold only hits and misses"));
        }
        let slot = self.marks.entry((row, col)).or_insert(marker);
        if *slot != Marker::Hit {
            *slot = marker;
        }
        Ok(())
    }

    /// Number of tracking marks recorded.
    pub fn revealed(&self) -> usize {
        self.marks.len()
    }

    /// Boat segments not yet hit.
    pub fn intact_segments(&self) -> usize {
        self.boats.iter().map(|b| b.intact_segments()).sum()
    }

    /// `true` when the fleet has no intact segment left.
    pub fn is_destroyed(&self) -> bool {
        self.intact_segments() == 0
    }

    /// A random valid anchor and orientation for `class`.
    pub fn random_placement<R: Rng>(
        &self,
        rng: &mut R,
        class: BoatClass,
    ) -> Result<(Position, Orientation), GameError> {
        let n = self.map_size;
        for _ in 0..RANDOM_ATTEMPTS {
            let orientation = if rng.random() {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let anchor = (rng.random_range(0..n), rng.random_range(0..n));
            if validator::is_placement_valid(self, anchor, orientation, class) {
                return Ok((anchor, orientation));
            }
        }
        // crowded board; fall back to the first free slot
        (0..n)
            .flat_map(|r| (0..n).map(move |c| (r, c)))
            .flat_map(|p| [(p, Orientation::Horizontal), (p, Orientation::Vertical)])
            .find(|&(p, o)| validator::is_placement_valid(self, p, o, class))
            .ok_or(GameError::Placement(PlacementError::TooClose))
    }

    /// Fill every remaining quota slot with random placements.
    pub fn place_randomly<R: Rng>(
        &mut self,
        rng: &mut R,
        quota: &FleetQuota,
    ) -> Result<usize, GameError> {
        let mut placed = 0;
        for class in CLASSES {
            while self.can_add(class, quota) {
                let (anchor, orientation) = self.random_placement(rng, class)?;
                self.place(class, anchor, orientation, quota)?;
                placed += 1;
            }
        }
        Ok(placed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupancy_matches_render() {
        let mut board = Board::fleet(PlayerId(1), 6);
        let quota = FleetQuota::default();
        board
            .place(BoatClass::Frigate, (1, 2), Orientation::Vertical, &quota)
            .unwrap();
        let grid = board.grid(false);
        for r in 0..6 {
            for c in 0..6 {
                assert_eq!(board.occupancy_at(r, c).unwrap(), grid.get(r, c).unwrap());
            }
        }
    }

    #[test]
    fn tracking_hit_is_never_downgraded() {
        let mut board = Board::tracking(PlayerId(1), PlayerId(2), 5);
        board.record(2, 2, Marker::Hit).unwrap();
        board.record(2, 2, Marker::Miss).unwrap();
        assert_eq!(board.occupancy_at(2, 2).unwrap(), Marker::Hit);
        assert_eq!(board.revealed(), 1);
    }
}
