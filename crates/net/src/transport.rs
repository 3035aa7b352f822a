//! TCP transport: packet-level reader and writer halves over a tokio stream.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::codec::{encode_into, FrameDecoder};
use crate::error::TransportError;
use crate::protocol::{Direction, Packet};

const READ_CHUNK: usize = 16 * 1024;

/// Connect to `addr` within `timeout` and split into packet halves.
pub async fn connect(
    addr: &str,
    timeout: Duration,
) -> Result<(PacketReader, PacketWriter), TransportError> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timed out")
        })??;
    stream.set_nodelay(true)?;
    let peer = stream.peer_addr()?;
    debug!(%peer, "tcp connected");
    Ok(split(stream, Direction::Clientbound))
}

/// Split an established stream. `inbound` is the direction of packets read.
pub fn split(stream: TcpStream, inbound: Direction) -> (PacketReader, PacketWriter) {
    let peer = stream.peer_addr().ok();
    let (read, write) = stream.into_split();
    (
        PacketReader {
            half: read,
            decoder: FrameDecoder::new(inbound),
            peer,
        },
        PacketWriter { half: write },
    )
}

/// Reads whole packets from the socket.
#[derive(Debug)]
pub struct PacketReader {
    half: OwnedReadHalf,
    decoder: FrameDecoder,
    peer: Option<SocketAddr>,
}

impl PacketReader {
    /// Next packet, or `None` once the peer closed the stream cleanly.
    ///
    /// Cancel safe: bytes already read stay buffered in the decoder.
    pub async fn next(&mut self) -> Result<Option<Packet>, TransportError> {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            if let Some(packet) = self.decoder.next_packet()? {
                trace!(packet = packet.name(), "received");
                return Ok(Some(packet));
            }
            let n = self.half.read(&mut buf).await?;
            if n == 0 {
                if self.decoder.buffered() > 0 {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "stream ended inside a packet",
                    )
                    .into());
                }
                debug!(peer = ?self.peer, "peer closed stream");
                return Ok(None);
            }
            self.decoder.extend(&buf[..n]);
        }
    }
}

/// Writes packets to the socket.
#[derive(Debug)]
pub struct PacketWriter {
    half: OwnedWriteHalf,
}

impl PacketWriter {
    /// Encode and write one packet.
    pub async fn send(&mut self, packet: &Packet) -> Result<(), TransportError> {
        let mut out = Vec::new();
        encode_into(packet, &mut out);
        self.half.write_all(&out).await?;
        trace!(packet = packet.name(), bytes = out.len(), "sent");
        Ok(())
    }

    /// Encode and write a batch with a single syscall.
    pub async fn send_all(&mut self, packets: &[Packet]) -> Result<(), TransportError> {
        let mut out = Vec::new();
        for packet in packets {
            encode_into(packet, &mut out);
        }
        self.half.write_all(&out).await?;
        Ok(())
    }

    /// Shut down the write side.
    pub async fn shutdown(&mut self) -> Result<(), TransportError> {
        self.half.shutdown().await?;
        Ok(())
    }
}
