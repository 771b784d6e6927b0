//! Commonly used types for ease of import.

pub use crate::{
    AttackOutcome, AttackReport, BoatClass, Board, FleetQuota, GameError, Marker, MatchPhase,
    Orientation, PlacementError, PlayerId, Room, RoomId, RoomSettings, UserId,
};

#[cfg(feature = "std")]
pub use crate::{
    transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport},
    InMemoryRepository, RoomApi, RoomService, Skeleton, Stub,
};
