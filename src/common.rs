//! Identifiers, attack outcomes and the engine error taxonomy.

use alloc::string::String;
use core::fmt;

use crate::grid::GridError;
use crate::ship::BoatClass;

/// A `(row, col)` coordinate, zero-based.
pub type Position = (usize, usize);

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Key of a room.
    RoomId
);
id_type!(
    /// Key of a player, unique within its room.
    PlayerId
);
id_type!(
    /// Already-authenticated account supplied by the caller.
    UserId
);

/// Result of resolving one attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackOutcome {
    /// An intact segment was damaged.
    Hit,
    /// The hit destroyed the last intact segment of a boat.
    Sunk(BoatClass),
    /// Nothing was at the target.
    Miss,
    /// The target segment had already been hit; nothing changed.
    AlreadyHit,
}

impl AttackOutcome {
    /// `true` when the attack damaged a boat on this call.
    pub fn is_fresh_hit(&self) -> bool {
        matches!(self, AttackOutcome::Hit | AttackOutcome::Sunk(_))
    }
}

/// Everything an attack changed in the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackReport {
    pub position: Position,
    pub outcome: AttackOutcome,
    /// Set when this attack destroyed the victim's last boat.
    pub eliminated: Option<PlayerId>,
    /// Set when this attack ended the match.
    pub winner: Option<PlayerId>,
}

/// Broad category of an engine failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// Bad input from the player; nothing changed.
    Validation,
    /// The operation is not allowed in the current state.
    Precondition,
    /// A referenced room, player or board does not exist.
    NotFound,
    /// Internal bookkeeping is inconsistent. Never expected.
    Invariant,
}

/// Why a boat could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum PlacementError {
    /// Part of the boat would leave the grid.
    OutOfBounds,
    /// The boat would overlap or touch another boat.
    TooClose,
    /// The room quota for this class is already used up.
    QuotaExceeded(BoatClass),
    /// Orientation was neither horizontal nor vertical.
    InvalidOrientation,
    /// Boats can only be placed on a fleet board.
    NotAFleetBoard,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::OutOfBounds => write!(f, "boat does not fit inside the grid"),
            PlacementError::TooClose => write!(f, "boat overlaps or touches another boat"),
            PlacementError::QuotaExceeded(class) => {
                write!(f, "no {} left to place", class.name())
            }
            PlacementError::InvalidOrientation => write!(f, "orientation must be H or V"),
            PlacementError::NotAFleetBoard => write!(f, "boats can only be placed on a fleet board"),
        }
    }
}

/// Reason a match cannot start yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum StartBlocker {
    NotEnoughPlayers,
    PlayersNotReady,
    AlreadyStarted,
}

impl fmt::Display for StartBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartBlocker::NotEnoughPlayers => write!(f, "at least one opponent is missing"),
            StartBlocker::PlayersNotReady => write!(f, "some players are not ready"),
            StartBlocker::AlreadyStarted => write!(f, "the match has already started"),
        }
    }
}

/// Errors returned by engine operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Rejected boat placement.
    Placement(PlacementError),
    /// Coordinate outside the room grid.
    OutOfBounds { row: usize, col: usize },
    /// Room settings or join data were rejected.
    InvalidSettings(&'static str),
    /// The match cannot start.
    NotReady(StartBlocker),
    /// Operation requires an active match.
    MatchNotActive,
    /// Operation is only allowed before the match starts.
    MatchAlreadyStarted,
    /// Only the turn holder may do this.
    NotYourTurn,
    /// No player holds the turn.
    NoTurnHolder,
    /// A player tried to attack their own fleet.
    SelfAttack,
    /// The victim has no boats left.
    VictimEliminated(PlayerId),
    /// A ready player's fleet is locked.
    PlayerReady,
    /// Readiness needs every boat of the quota on the board.
    FleetIncomplete,
    /// The user already has a player in this room.
    AlreadyJoined(UserId),
    /// The room holds the maximum number of players.
    RoomFull,
    RoomNotFound(RoomId),
    PlayerNotFound(PlayerId),
    /// The user has no player in this room.
    UserNotInRoom(UserId),
    /// A boat type name that matches no class.
    UnknownBoatType(String),
    /// Internal inconsistency.
    Invariant(&'static str),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::Placement(_)
            | GameError::OutOfBounds { .. }
            | GameError::InvalidSettings(_) => ErrorKind::Validation,
            GameError::NotReady(_)
            | GameError::MatchNotActive
            | GameError::MatchAlreadyStarted
            | GameError::NotYourTurn
            | GameError::NoTurnHolder
            | GameError::SelfAttack
            | GameError::VictimEliminated(_)
            | GameError::PlayerReady
            | GameError::FleetIncomplete
            | GameError::AlreadyJoined(_)
            | GameError::RoomFull => ErrorKind::Precondition,
            GameError::RoomNotFound(_)
            | GameError::PlayerNotFound(_)
            | GameError::UserNotInRoom(_) => ErrorKind::NotFound,
            GameError::UnknownBoatType(_) | GameError::Invariant(_) => ErrorKind::Invariant,
        }
    }
}

impl From<PlacementError> for GameError {
    fn from(err: PlacementError) -> Self {
        GameError::Placement(err)
    }
}

impl From<GridError> for GameError {
    fn from(err: GridError) -> Self {
        match err {
            GridError::IndexOutOfBounds { row, col } => GameError::OutOfBounds { row, col },
        }
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::Placement(e) => write!(f, "invalid placement: {}", e),
            GameError::OutOfBounds { row, col } => {
                write!(f, "position ({}, {}) is outside the grid", row, col)
            }
            GameError::InvalidSettings(why) => write!(f, "invalid settings: {}", why),
            GameError::NotReady(why) => write!(f, "match cannot start: {}", why),
            GameError::MatchNotActive => write!(f, "the match is not running"),
            GameError::MatchAlreadyStarted => write!(f, "the match has already started"),
            GameError::NotYourTurn => write!(f, "it is not your turn"),
            GameError::NoTurnHolder => write!(f, "no player holds the turn"),
            GameError::SelfAttack => write!(f, "a player cannot attack their own fleet"),
            GameError::VictimEliminated(id) => write!(f, "player {} has no boats left", id),
            GameError::PlayerReady => write!(f, "fleet is locked once the player is ready"),
            GameError::FleetIncomplete => write!(f, "place every boat before declaring ready"),
            GameError::AlreadyJoined(user) => write!(f, "user {} is already in this room", user),
            GameError::RoomFull => write!(f, "the room is full"),
            GameError::RoomNotFound(id) => write!(f, "room {} not found", id),
            GameError::PlayerNotFound(id) => write!(f, "player {} not found", id),
            GameError::UserNotInRoom(user) => write!(f, "user {} has no player in this room", user),
            GameError::UnknownBoatType(name) => write!(f, "unknown boat type {:?}", name),
            GameError::Invariant(what) => write!(f, "invariant violated: {}", what),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GameError {}
