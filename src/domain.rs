//! Read-only views handed to callers outside the engine.

use alloc::string::String;
use alloc::vec::Vec;

use crate::board::{Board, BoardKind};
use crate::common::{PlayerId, RoomId};
use crate::config::FleetQuota;
use crate::room::{MatchPhase, Room};
use crate::ship::BoatClass;

/// One line of a room listing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub map_size: usize,
    pub phase: MatchPhase,
    pub players: usize,
    pub winner: Option<PlayerId>,
}

impl From<&Room> for RoomSummary {
    fn from(room: &Room) -> Self {
        RoomSummary {
            id: room.id(),
            name: room.name().into(),
            map_size: room.map_size(),
            phase: room.phase(),
            players: room.player_count(),
            winner: room.winner(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub admin: bool,
    pub ready: bool,
    pub on_game: bool,
    pub turn_index: Option<usize>,
    pub has_turn: bool,
}

/// Full public state of a room.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomView {
    pub summary: RoomSummary,
    pub quota: FleetQuota,
    pub players: Vec<PlayerView>,
    pub turn_holder: Option<PlayerId>,
}

impl From<&Room> for RoomView {
    fn from(room: &Room) -> Self {
        let holder = room.turn_holder();
        let players = room
            .players()
            .iter()
            .map(|p| PlayerView {
                id: p.id(),
                name: p.name().into(),
                admin: p.is_admin(),
                ready: p.is_ready(),
                on_game: p.is_on_game(),
                turn_index: room.turn_index_of(p.id()),
                has_turn: holder == Some(p.id()),
            })
            .collect();
        RoomView {
            summary: RoomSummary::from(room),
            quota: *room.quota(),
            players,
            turn_holder: holder,
        }
    }
}

/// Rendered board as shown to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardView {
    pub owner: PlayerId,
    /// Opponent a tracking board refers to; `None` for the fleet board.
    pub victim: Option<PlayerId>,
    /// Enumerated marker matrix.
    pub cells: Vec<Vec<String>>,
    /// Classes still to be placed. Empty for tracking boards.
    pub available: Vec<BoatClass>,
}

impl BoardView {
    pub fn new(board: &Board, quota: &FleetQuota) -> Self {
        let (victim, available) = match board.kind() {
            BoardKind::Fleet => (None, board.available_classes(quota)),
            BoardKind::Tracking { victim } => (Some(victim), Vec::new()),
        };
        BoardView {
            owner: board.owner(),
            victim,
            cells: board.render(false, true),
            available,
        }
    }
}
