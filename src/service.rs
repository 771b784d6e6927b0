#![cfg(feature = "std")]
//! Room operations as units of work over a repository.
//!
//! Every mutating call takes the room's lock, loads the room, applies one
//! engine operation and saves the result. A failed operation saves nothing.
//! Rooms never share a lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::common::{AttackReport, ErrorKind, GameError, PlayerId, RoomId, UserId};
use crate::config::RoomSettings;
use crate::domain::{BoardView, RoomSummary, RoomView};
use crate::protocol::RoomApi;
use crate::repository::RoomRepository;
use crate::room::Room;
use crate::ship::{BoatClass, Orientation};

type RoomLock = Arc<tokio::sync::Mutex<()>>;
type LockTable = Mutex<HashMap<RoomId, RoomLock>>;

/// A claim on one room's lock. The table entry lives only while some call
/// holds a lease on it, so ids that name no room leave nothing behind.
struct LockLease<'a> {
    table: &'a LockTable,
    id: RoomId,
    lock: RoomLock,
}

impl Drop for LockLease<'_> {
    fn drop(&mut self) {
        let Ok(mut locks) = self.table.lock() else {
            return;
        };
        // the table's copy plus ours
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.id);
        }
    }
}

pub struct RoomService<R: RoomRepository> {
    repo: R,
    locks: LockTable,
}

impl<R: RoomRepository> RoomService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    fn lease(&self, id: RoomId) -> anyhow::Result<LockLease<'_>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| anyhow::anyhow!("room lock table poisoned"))?;
        let lock = locks.entry(id).or_default().clone();
        Ok(LockLease {
            table: &self.locks,
            id,
            lock,
        })
    }

    #[cfg(test)]
    fn live_locks(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or_default()
    }

    async fn load(&self, id: RoomId) -> anyhow::Result<Room> {
        self.repo
            .load(id)
            .await?
            .ok_or_else(|| GameError::RoomNotFound(id).into())
    }

    /// Run `op` on room `id` under its exclusive lock and persist the result.
    pub async fn with_room<T, F>(&self, id: RoomId, op: F) -> anyhow::Result<T>
    where
        F: FnOnce(&mut Room) -> Result<T, GameError> + Send,
        T: Send,
    {
        let lease = self.lease(id)?;
        let _guard = lease.lock.lock().await;
        let mut room = self.load(id).await?;
        let out = op(&mut room).map_err(|e| {
            match e.kind() {
                ErrorKind::Invariant => log::error!("room {}: {}", id, e),
                _ => log::warn!("room {}: rejected: {}", id, e),
            }
            anyhow::Error::new(e)
        })?;
        self.repo.save(&room).await?;
        Ok(out)
    }

    /// Read-only access; waits for in-flight writes on the same room.
    async fn read_room<T, F>(&self, id: RoomId, view: F) -> anyhow::Result<T>
    where
        F: FnOnce(&Room) -> Result<T, GameError> + Send,
        T: Send,
    {
        let lease = self.lease(id)?;
        let _guard = lease.lock.lock().await;
        let room = self.load(id).await?;
        view(&room).map_err(anyhow::Error::new)
    }
}

fn player_of(room: &Room, user: UserId) -> Result<PlayerId, GameError> {
    room.player_of_user(user).map(|p| p.id())
}

#[async_trait::async_trait]
impl<R: RoomRepository> RoomApi for RoomService<R> {
    async fn create_room(&self, user: UserId, settings: RoomSettings) -> anyhow::Result<RoomId> {
        let id = self.repo.next_id().await?;
        let room = Room::new(id, user, settings).map_err(anyhow::Error::new)?;
        self.repo.save(&room).await?;
        log::info!("room {} ({:?}) created by user {}", id, room.name(), user);
        Ok(id)
    }

    async fn list_rooms(&self) -> anyhow::Result<Vec<RoomSummary>> {
        let rooms = self.repo.list().await?;
        Ok(rooms.iter().map(RoomSummary::from).collect())
    }

    async fn room(&self, room: RoomId) -> anyhow::Result<RoomView> {
        self.read_room(room, |r| Ok(RoomView::from(r))).await
    }

    async fn join_room(&self, room: RoomId, user: UserId, name: String) -> anyhow::Result<PlayerId> {
        let id = self.with_room(room, |r| r.join(user, &name)).await?;
        log::info!("room {}: user {} joined as player {}", room, user, id);
        Ok(id)
    }

    async fn leave_room(&self, room: RoomId, user: UserId) -> anyhow::Result<()> {
        self.with_room(room, |r| {
            let id = player_of(r, user)?;
            r.leave(id)
        })
        .await?;
        log::info!("room {}: user {} left", room, user);
        Ok(())
    }

    async fn place_boat(
        &self,
        room: RoomId,
        user: UserId,
        class: BoatClass,
        anchor: (usize, usize),
        orientation: Orientation,
    ) -> anyhow::Result<bool> {
        let ready = self
            .with_room(room, |r| {
                let id = player_of(r, user)?;
                r.place_boat(id, class, anchor, orientation)?;
                r.player(id).map(|p| p.is_ready())
            })
            .await?;
        log::debug!(
            "room {}: user {} placed {} at {:?} {:?}",
            room,
            user,
            class,
            anchor,
            orientation
        );
        Ok(ready)
    }

    async fn auto_place(&self, room: RoomId, user: UserId, seed: Option<u64>) -> anyhow::Result<()> {
        let mut rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        let placed = self
            .with_room(room, |r| {
                let id = player_of(r, user)?;
                r.place_fleet_randomly(id, &mut rng)
            })
            .await?;
        log::debug!("room {}: user {} auto-placed {} boats", room, user, placed);
        Ok(())
    }

    async fn set_ready(&self, room: RoomId, user: UserId, ready: bool) -> anyhow::Result<()> {
        self.with_room(room, |r| {
            let id = player_of(r, user)?;
            r.set_ready(id, ready)
        })
        .await
    }

    async fn start_match(&self, room: RoomId, user: UserId) -> anyhow::Result<PlayerId> {
        let first = self
            .with_room(room, |r| {
                player_of(r, user)?;
                r.start_match()
            })
            .await?;
        log::info!("room {}: match started, player {} moves first", room, first);
        Ok(first)
    }

    async fn end_turn(&self, room: RoomId, user: UserId) -> anyhow::Result<PlayerId> {
        let next = self
            .with_room(room, |r| {
                let id = player_of(r, user)?;
                if r.turn_holder() != Some(id) {
                    return Err(GameError::NotYourTurn);
                }
                r.end_turn()
            })
            .await?;
        log::debug!("room {}: turn passes to player {}", room, next);
        Ok(next)
    }

    async fn attack(
        &self,
        room: RoomId,
        user: UserId,
        victim: PlayerId,
        pos: (usize, usize),
    ) -> anyhow::Result<AttackReport> {
        let report = self
            .with_room(room, |r| {
                let id = player_of(r, user)?;
                r.attack(pos, id, victim)
            })
            .await?;
        log::debug!(
            "room {}: user {} fired at player {} {:?}: {:?}",
            room,
            user,
            victim,
            pos,
            report.outcome
        );
        if let Some(out) = report.eliminated {
            log::info!("room {}: player {} has no boats left", room, out);
        }
        if let Some(winner) = report.winner {
            log::info!("room {}: player {} wins", room, winner);
        }
        Ok(report)
    }

    async fn board(
        &self,
        room: RoomId,
        user: UserId,
        victim: Option<PlayerId>,
    ) -> anyhow::Result<BoardView> {
        self.read_room(room, |r| {
            let id = player_of(r, user)?;
            let board = r.view_board(id, victim)?;
            Ok(BoardView::new(&board, r.quota()))
        })
        .await
    }
}
