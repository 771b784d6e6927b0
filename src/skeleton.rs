#![cfg(feature = "std")]
//! Server side of the protocol: decodes requests and calls a [`RoomApi`].

use std::sync::Arc;

use anyhow::anyhow;
use tokio::net::TcpListener;
use tokio::time::Duration;

use crate::common::ErrorKind;
use crate::protocol::{error_kind, Message, Request, Response, RoomApi, PROTOCOL_VERSION};
use crate::transport::tcp::{TcpTransport, MAX_FRAME_SIZE};
use crate::transport::{ConnectionClosed, Transport};

/// Answer one request. Failures become [`Response::Error`].
pub async fn dispatch<A: RoomApi + ?Sized>(api: &A, req: Request) -> Response {
    let result = match req {
        Request::CreateRoom { user, settings } => {
            api.create_room(user, settings).await.map(Response::Created)
        }
        Request::ListRooms => api.list_rooms().await.map(Response::Rooms),
        Request::GetRoom { room } => api.room(room).await.map(Response::Room),
        Request::JoinRoom { room, user, name } => {
            api.join_room(room, user, name).await.map(Response::Joined)
        }
        Request::LeaveRoom { room, user } => api.leave_room(room, user).await.map(|()| Response::Ack),
        Request::PlaceBoat {
            room,
            user,
            class,
            row,
            col,
            orientation,
        } => api
            .place_boat(room, user, class, (row, col), orientation)
            .await
            .map(|ready| Response::Placed { ready }),
        Request::AutoPlace { room, user, seed } => api
            .auto_place(room, user, seed)
            .await
            .map(|()| Response::Placed { ready: true }),
        Request::SetReady { room, user, ready } => {
            api.set_ready(room, user, ready).await.map(|()| Response::Ack)
        }
        Request::StartMatch { room, user } => api
            .start_match(room, user)
            .await
            .map(|first| Response::Started { first }),
        Request::EndTurn { room, user } => api
            .end_turn(room, user)
            .await
            .map(|holder| Response::TurnPassed { holder }),
        Request::Attack {
            room,
            user,
            victim,
            row,
            col,
        } => api
            .attack(room, user, victim, (row, col))
            .await
            .map(Response::Attack),
        Request::GetBoard { room, user, victim } => {
            api.board(room, user, victim).await.map(Response::Board)
        }
    };
    result.unwrap_or_else(|e| Response::Error {
        // storage and transport faults have no engine kind
        kind: error_kind(&e).unwrap_or(ErrorKind::Invariant),
        message: e.to_string(),
    })
}

/// Serves one connection until the peer goes away.
pub struct Skeleton<A: RoomApi + ?Sized, T: Transport> {
    api: Arc<A>,
    transport: T,
}

impl<A: RoomApi + ?Sized, T: Transport> Skeleton<A, T> {
    pub fn new(api: Arc<A>, transport: T) -> Self {
        Self { api, transport }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        match self.transport.recv().await? {
            Message::Hello { version } if version == PROTOCOL_VERSION => {
                self.transport
                    .send(Message::Hello {
                        version: PROTOCOL_VERSION,
                    })
                    .await?;
            }
            Message::Hello { version } => {
                return Err(anyhow!(
                    "Protocol version mismatch: expected {}, got {}",
                    PROTOCOL_VERSION,
                    version
                ))
            }
            _ => return Err(anyhow!("Expected handshake")),
        }

        loop {
            let msg = match self.transport.recv().await {
                Ok(msg) => msg,
                Err(e) if e.is::<ConnectionClosed>() => {
                    log::debug!("session closed by peer");
                    return Ok(());
                }
                Err(e) => {
                    log::warn!("session aborted: {}", e);
                    return Err(e);
                }
            };
            match msg {
                Message::Request { seq, body } => {
                    let reply = dispatch(self.api.as_ref(), body).await;
                    self.transport
                        .send(Message::Response { seq, body: reply })
                        .await?;
                }
                other => {
                    log::warn!("ignoring unexpected message {:?}", other);
                }
            }
        }
    }
}

/// Accept connections forever, one task per client.
pub async fn serve<A>(listener: TcpListener, api: Arc<A>, idle: Duration) -> anyhow::Result<()>
where
    A: RoomApi + 'static,
{
    loop {
        let (stream, addr) = listener.accept().await?;
        log::info!("client connected from {}", addr);
        let transport = TcpTransport::with_config(stream, idle, MAX_FRAME_SIZE);
        let mut skeleton = Skeleton::new(api.clone(), transport);
        tokio::spawn(async move {
            match skeleton.run().await {
                Ok(()) => log::info!("client {} disconnected", addr),
                Err(e) => log::info!("client {} dropped: {}", addr, e),
            }
        });
    }
}
