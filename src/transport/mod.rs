#![cfg(feature = "std")]
//! Message transports between a room client and the server.

use std::fmt;

use crate::protocol::Message;

/// The peer hung up. Sessions end cleanly on this; any other transport
/// error is a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionClosed;

impl fmt::Display for ConnectionClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Connection closed by peer")
    }
}

impl std::error::Error for ConnectionClosed {}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<Message>;
}

pub mod in_memory;
pub mod tcp;
