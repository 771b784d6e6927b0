//! Length-prefixed bincode frames over TCP.
//!
//! Each frame is a big-endian `u32` byte count followed by the bincode
//! encoding of one [`Message`].

use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration};

use crate::protocol::Message;
use crate::transport::{ConnectionClosed, Transport};

/// Default timeout for a single send or receive (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest accepted frame (1 MB). Rendered boards stay far below this.
pub const MAX_FRAME_SIZE: u32 = 1_000_000;

fn io_error(e: std::io::Error, op: &str) -> anyhow::Error {
    match e.kind() {
        ErrorKind::UnexpectedEof | ErrorKind::BrokenPipe | ErrorKind::ConnectionReset => {
            ConnectionClosed.into()
        }
        _ => anyhow::anyhow!("{} error: {}", op, e),
    }
}

/// Encode `msg` and write it as one frame.
pub async fn write_frame<W>(writer: &mut W, msg: &Message, max_size: u32) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let data =
        bincode::serialize(msg).map_err(|e| anyhow::anyhow!("Serialization error: {}", e))?;
    if data.len() > max_size as usize {
        return Err(anyhow::anyhow!(
            "Message too large: {} bytes (max: {})",
            data.len(),
            max_size
        ));
    }
    let len = (data.len() as u32).to_be_bytes();
    writer.write_all(&len).await.map_err(|e| io_error(e, "Write"))?;
    writer.write_all(&data).await.map_err(|e| io_error(e, "Write"))?;
    writer.flush().await.map_err(|e| io_error(e, "Write"))?;
    Ok(())
}

/// Read one frame and decode it.
pub async fn read_frame<R>(reader: &mut R, max_size: u32) -> anyhow::Result<Message>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    reader
        .read_exact(&mut len_buf)
        .await
        .map_err(|e| io_error(e, "Read"))?;
    let len = u32::from_be_bytes(len_buf);
    if len > max_size {
        return Err(anyhow::anyhow!(
            "Message too large: {} bytes (max: {})",
            len,
            max_size
        ));
    }
    if len == 0 {
        return Err(anyhow::anyhow!("Invalid message length: 0"));
    }
    let mut buf = vec![0u8; len as usize];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|e| io_error(e, "Read"))?;
    bincode::deserialize(&buf).map_err(|e| anyhow::anyhow!("Deserialization error: {}", e))
}

pub struct TcpTransport {
    stream: TcpStream,
    timeout_duration: Duration,
    max_frame_size: u32,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_config(stream, DEFAULT_TIMEOUT, MAX_FRAME_SIZE)
    }

    pub fn with_config(stream: TcpStream, timeout_duration: Duration, max_frame_size: u32) -> Self {
        Self {
            stream,
            timeout_duration,
            max_frame_size,
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream))
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        let max = self.max_frame_size;
        timeout(self.timeout_duration, write_frame(&mut self.stream, &msg, max))
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", self.timeout_duration))?
    }

    async fn recv(&mut self) -> anyhow::Result<Message> {
        let max = self.max_frame_size;
        timeout(self.timeout_duration, read_frame(&mut self.stream, max))
            .await
            .map_err(|_| anyhow::anyhow!("Receive timeout after {:?}", self.timeout_duration))?
    }
}
