use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::common::RoomId;
use crate::repository::RoomRepository;
use crate::room::Room;

/// Rooms kept in process memory.
#[derive(Default)]
pub struct InMemoryRepository {
    rooms: Mutex<BTreeMap<RoomId, Room>>,
    last_id: AtomicU64,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn rooms(&self) -> anyhow::Result<std::sync::MutexGuard<'_, BTreeMap<RoomId, Room>>> {
        self.rooms
            .lock()
            .map_err(|_| anyhow::anyhow!("room store poisoned"))
    }
}

#[async_trait::async_trait]
impl RoomRepository for InMemoryRepository {
    async fn next_id(&self) -> anyhow::Result<RoomId> {
        Ok(RoomId(self.last_id.fetch_add(1, Ordering::SeqCst) + 1))
    }

    async fn load(&self, id: RoomId) -> anyhow::Result<Option<Room>> {
        Ok(self.rooms()?.get(&id).cloned())
    }

    async fn save(&self, room: &Room) -> anyhow::Result<()> {
        self.rooms()?.insert(room.id(), room.clone());
        Ok(())
    }

    async fn list(&self) -> anyhow::Result<Vec<Room>> {
        Ok(self.rooms()?.values().cloned().collect())
    }

    async fn remove(&self, id: RoomId) -> anyhow::Result<bool> {
        Ok(self.rooms()?.remove(&id).is_some())
    }
}
