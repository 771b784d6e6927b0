#![cfg(feature = "std")]
//! Persistence contract for rooms.
//!
//! A room is the unit of storage: its players, boards, boats and cells are
//! loaded and saved together.

use crate::common::RoomId;
use crate::room::Room;

#[async_trait::async_trait]
pub trait RoomRepository: Send + Sync {
    /// Reserve a fresh room key.
    async fn next_id(&self) -> anyhow::Result<RoomId>;
    async fn load(&self, id: RoomId) -> anyhow::Result<Option<Room>>;
    /// Insert or replace the stored room.
    async fn save(&self, room: &Room) -> anyhow::Result<()>;
    /// Every stored room, ordered by id.
    async fn list(&self) -> anyhow::Result<Vec<Room>>;
    /// Returns `false` when nothing was stored under `id`.
    async fn remove(&self, id: RoomId) -> anyhow::Result<bool>;
}

pub mod file;
pub mod in_memory;

pub use file::FileRepository;
pub use in_memory::InMemoryRepository;
