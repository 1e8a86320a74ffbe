//! Length-prefixed packet framing over any persistent byte stream.
//!
//! Format: [4 bytes little-endian payload length][bincode payload]. The
//! stream supplies ordering and connection lifetime; framing only restores
//! message boundaries.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::Packet;

/// Upper bound on a single frame; anything larger is a protocol violation.
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

/// Reads one packet. `UnexpectedEof` means the peer closed the connection.
pub async fn read_packet<R: AsyncRead + Unpin>(stream: &mut R) -> io::Result<Packet> {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).await?;
    let len = u32::from_le_bytes(len_buf) as usize;

    if len == 0 || len > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("bad frame length {}", len),
        ));
    }

    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await?;

    bincode::deserialize(&payload).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Writes and flushes one packet.
pub async fn write_packet<W: AsyncWrite + Unpin>(stream: &mut W, packet: &Packet) -> io::Result<()> {
    let payload =
        bincode::serialize(packet).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    if payload.len() > MAX_FRAME_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("frame too large: {} bytes", payload.len()),
        ));
    }

    stream.write_all(&(payload.len() as u32).to_le_bytes()).await?;
    stream.write_all(&payload).await?;
    stream.flush().await
}
