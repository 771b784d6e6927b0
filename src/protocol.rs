#![cfg(feature = "std")]
//! Request/response messages and the room API they map onto.

use crate::common::{AttackReport, ErrorKind, GameError, PlayerId, RoomId, UserId};
use crate::config::RoomSettings;
use crate::domain::{BoardView, RoomSummary, RoomView};
use crate::ship::{BoatClass, Orientation};

/// Bumped whenever the message layout changes.
pub const PROTOCOL_VERSION: u16 = 1;

/// Operations a client may ask for. `user` is the caller's authenticated
/// identity.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Request {
    CreateRoom { user: UserId, settings: RoomSettings },
    ListRooms,
    GetRoom { room: RoomId },
    JoinRoom { room: RoomId, user: UserId, name: String },
    LeaveRoom { room: RoomId, user: UserId },
    PlaceBoat {
        room: RoomId,
        user: UserId,
        class: BoatClass,
        row: usize,
        col: usize,
        orientation: Orientation,
    },
    /// Place every remaining boat at random.
    AutoPlace { room: RoomId, user: UserId, seed: Option<u64> },
    SetReady { room: RoomId, user: UserId, ready: bool },
    StartMatch { room: RoomId, user: UserId },
    EndTurn { room: RoomId, user: UserId },
    Attack {
        room: RoomId,
        user: UserId,
        victim: PlayerId,
        row: usize,
        col: usize,
    },
    /// `victim: None` asks for the caller's fleet board.
    GetBoard { room: RoomId, user: UserId, victim: Option<PlayerId> },
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Response {
    Created(RoomId),
    Room(RoomView),
    Rooms(Vec<RoomSummary>),
    Joined(PlayerId),
    /// Boat accepted; `ready` tells whether the fleet is now complete.
    Placed { ready: bool },
    /// The match started and `first` holds the turn.
    Started { first: PlayerId },
    TurnPassed { holder: PlayerId },
    Attack(AttackReport),
    Board(BoardView),
    Ack,
    Error { kind: ErrorKind, message: String },
}

/// Frames exchanged over a transport.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Message {
    Hello { version: u16 },
    Request { seq: u64, body: Request },
    Response { seq: u64, body: Response },
}

/// Engine failure reported by the remote side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub kind: ErrorKind,
    pub message: String,
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RemoteError {}

/// Category of a failed call, whether it happened locally or remotely.
pub fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
    if let Some(e) = err.downcast_ref::<GameError>() {
        return Some(e.kind());
    }
    err.downcast_ref::<RemoteError>().map(|e| e.kind)
}

/// Room operations, implemented locally by the service and remotely by the
/// stub.
#[async_trait::async_trait]
pub trait RoomApi: Send + Sync {
    async fn create_room(&self, user: UserId, settings: RoomSettings) -> anyhow::Result<RoomId>;
    async fn list_rooms(&self) -> anyhow::Result<Vec<RoomSummary>>;
    async fn room(&self, room: RoomId) -> anyhow::Result<RoomView>;
    async fn join_room(&self, room: RoomId, user: UserId, name: String) -> anyhow::Result<PlayerId>;
    async fn leave_room(&self, room: RoomId, user: UserId) -> anyhow::Result<()>;
    async fn place_boat(
        &self,
        room: RoomId,
        user: UserId,
        class: BoatClass,
        anchor: (usize, usize),
        orientation: Orientation,
    ) -> anyhow::Result<bool>;
    async fn auto_place(&self, room: RoomId, user: UserId, seed: Option<u64>) -> anyhow::Result<()>;
    async fn set_ready(&self, room: RoomId, user: UserId, ready: bool) -> anyhow::Result<()>;
    async fn start_match(&self, room: RoomId, user: UserId) -> anyhow::Result<PlayerId>;
    async fn end_turn(&self, room: RoomId, user: UserId) -> anyhow::Result<PlayerId>;
    async fn attack(
        &self,
        room: RoomId,
        user: UserId,
        victim: PlayerId,
        pos: (usize, usize),
    ) -> anyhow::Result<AttackReport>;
    async fn board(
        &self,
        room: RoomId,
        user: UserId,
        victim: Option<PlayerId>,
    ) -> anyhow::Result<BoardView>;
}
