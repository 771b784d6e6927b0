#![cfg(feature = "std")]
//! Client side of the protocol: a [`RoomApi`] that forwards every call over a
//! transport.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::Mutex;

use crate::common::{AttackReport, PlayerId, RoomId, UserId};
use crate::config::RoomSettings;
use crate::domain::{BoardView, RoomSummary, RoomView};
use crate::protocol::{Message, RemoteError, Request, Response, RoomApi, PROTOCOL_VERSION};
use crate::ship::{BoatClass, Orientation};
use crate::transport::Transport;

pub struct Stub<T: Transport> {
    transport: Mutex<T>,
    seq: AtomicU64,
    handshaken: AtomicBool,
}

fn unexpected(resp: Response) -> anyhow::Error {
    anyhow::anyhow!("Unexpected response {:?}", resp)
}

impl<T: Transport> Stub<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Mutex::new(transport),
            seq: AtomicU64::new(0),
            handshaken: AtomicBool::new(false),
        }
    }

    async fn handshake(&self, transport: &mut T) -> anyhow::Result<()> {
        if self.handshaken.load(Ordering::SeqCst) {
            return Ok(());
        }
        transport
            .send(Message::Hello {
                version: PROTOCOL_VERSION,
            })
            .await?;
        match transport.recv().await? {
            Message::Hello { version } if version == PROTOCOL_VERSION => {
                self.handshaken.store(true, Ordering::SeqCst);
                Ok(())
            }
            Message::Hello { version } => Err(anyhow::anyhow!(
                "Protocol version mismatch: expected {}, got {}",
                PROTOCOL_VERSION,
                version
            )),
            _ => Err(anyhow::anyhow!("Expected handshake")),
        }
    }

    /// Send `req` and wait for its response. Remote failures come back as
    /// [`RemoteError`].
    pub async fn call(&self, req: Request) -> anyhow::Result<Response> {
        let mut transport = self.transport.lock().await;
        self.handshake(&mut transport).await?;
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        transport.send(Message::Request { seq, body: req }).await?;
        match transport.recv().await? {
            Message::Response {
                seq: got,
                body: Response::Error { kind, message },
            } if got == seq => Err(RemoteError { kind, message }.into()),
            Message::Response { seq: got, body } if got == seq => Ok(body),
            Message::Response { seq: got, .. } => Err(anyhow::anyhow!(
                "Sequence mismatch: expected {}, got {}",
                seq,
                got
            )),
            other => Err(anyhow::anyhow!("Unexpected message {:?}", other)),
        }
    }
}

#[async_trait::async_trait]
impl<T: Transport> RoomApi for Stub<T> {
    async fn create_room(&self, user: UserId, settings: RoomSettings) -> anyhow::Result<RoomId> {
        match self.call(Request::CreateRoom { user, settings }).await? {
            Response::Created(id) => Ok(id),
            other => Err(unexpected(other)),
        }
    }

    async fn list_rooms(&self) -> anyhow::Result<Vec<RoomSummary>> {
        match self.call(Request::ListRooms).await? {
            Response::Rooms(rooms) => Ok(rooms),
            other => Err(unexpected(other)),
        }
    }

    async fn room(&self, room: RoomId) -> anyhow::Result<RoomView> {
        match self.call(Request::GetRoom { room }).await? {
            Response::Room(view) => Ok(view),
            other => Err(unexpected(other)),
        }
    }

    async fn join_room(&self, room: RoomId, user: UserId, name: String) -> anyhow::Result<PlayerId> {
        match self.call(Request::JoinRoom { room, user, name }).await? {
            Response::Joined(id) => Ok(id),
            other => Err(unexpected(other)),
        }
    }

    async fn leave_room(&self, room: RoomId, user: UserId) -> anyhow::Result<()> {
        match self.call(Request::LeaveRoom { room, user }).await? {
            Response::Ack => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    async fn place_boat(
        &self,
        room: RoomId,
        user: UserId,
        class: BoatClass,
        anchor: (usize, usize),
        orientation: Orientation,
    ) -> anyhow::Result<bool> {
        let (row, col) = anchor;
        let req = Request::PlaceBoat {
            room,
            user,
            class,
            row,
            col,
            orientation,
        };
        match self.call(req).await? {
            Response::Placed { ready } => Ok(ready),
            other => Err(unexpected(other)),
        }
    }

    async fn auto_place(&self, room: RoomId, user: UserId, seed: Option<u64>) -> anyhow::Result<()> {
        match self.call(Request::AutoPlace { room, user, seed }).await? {
            Response::Placed { .. } => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    async fn set_ready(&self, room: RoomId, user: UserId, ready: bool) -> anyhow::Result<()> {
        match self.call(Request::SetReady { room, user, ready }).await? {
            Response::Ack => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    async fn start_match(&self, room: RoomId, user: UserId) -> anyhow::Result<PlayerId> {
        match self.call(Request::StartMatch { room, user }).await? {
            Response::Started { first } => Ok(first),
            other => Err(unexpected(other)),
        }
    }

    async fn end_turn(&self, room: RoomId, user: UserId) -> anyhow::Result<PlayerId> {
        match self.call(Request::EndTurn { room, user }).await? {
            Response::TurnPassed { holder } => Ok(holder),
            other => Err(unexpected(other)),
        }
    }

    async fn attack(
        &self,
        room: RoomId,
        user: UserId,
        victim: PlayerId,
        pos: (usize, usize),
    ) -> anyhow::Result<AttackReport> {
        let (row, col) = pos;
        let req = Request::Attack {
            room,
            user,
            victim,
            row,
            col,
        };
        match self.call(req).await? {
            Response::Attack(report) => Ok(report),
            other => Err(unexpected(other)),
        }
    }

    async fn board(
        &self,
        room: RoomId,
        user: UserId,
        victim: Option<PlayerId>,
    ) -> anyhow::Result<BoardView> {
        match self.call(Request::GetBoard { room, user, victim }).await? {
            Response::Board(view) => Ok(view),
            other => Err(unexpected(other)),
        }
    }
}
