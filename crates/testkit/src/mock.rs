//! Scripted single-connection server speaking protocol 61.
//!
//! A test hands [`MockServer::start`] an async script that receives the
//! accepted connection. Scripts usually run [`MockConnection::login`], send
//! a few play packets and then [`MockConnection::hold`] the connection open
//! until the client goes away.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use asciicraft_net::protocol::{EncryptionKeyRequest, EncryptionKeyResponse, Handshake, LoginRequest};
use asciicraft_net::{split, Direction, Packet, PacketReader, PacketWriter};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::debug;

/// Entity id the mock assigns to the joining player.
pub const MOCK_ENTITY_ID: i32 = 1000;

const FINISH_TIMEOUT: Duration = Duration::from_secs(5);

/// A listening mock server running one script.
pub struct MockServer {
    addr: SocketAddr,
    task: JoinHandle<Result<Vec<Packet>>>,
}

impl MockServer {
    /// Bind to an ephemeral local port and run `script` on the first
    /// connection accepted.
    pub async fn start<F, Fut>(script: F) -> Result<Self>
    where
        F: FnOnce(MockConnection) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Vec<Packet>>> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let task = tokio::spawn(async move {
            let (stream, peer) = listener.accept().await?;
            debug!(%peer, "mock server accepted");
            let (reader, writer) = split(stream, Direction::Serverbound);
            script(MockConnection {
                reader,
                writer,
                received: Vec::new(),
            })
            .await
        });
        Ok(Self { addr, task })
    }

    /// `host:port` to connect to.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Wait for the script to end and return what it collected.
    pub async fn finish(self) -> Result<Vec<Packet>> {
        tokio::time::timeout(FINISH_TIMEOUT, self.task)
            .await
            .context("mock script did not finish")?
            .context("mock script panicked")?
    }
}

/// The server side of one client connection.
pub struct MockConnection {
    reader: PacketReader,
    writer: PacketWriter,
    received: Vec<Packet>,
}

impl MockConnection {
    /// Next packet from the client; `None` once it hung up.
    pub async fn recv(&mut self) -> Result<Option<Packet>> {
        let packet = self.reader.next().await?;
        if let Some(packet) = &packet {
            self.received.push(packet.clone());
        }
        Ok(packet)
    }

    /// Read until a packet named `name` arrives, skipping others.
    pub async fn expect(&mut self, name: &str) -> Result<Packet> {
        loop {
            match self.recv().await? {
                Some(packet) if packet.name() == name => return Ok(packet),
                Some(other) => debug!(packet = other.name(), expected = name, "skipping"),
                None => bail!("client hung up while waiting for {name}"),
            }
        }
    }

    /// Send one packet.
    pub async fn send(&mut self, packet: impl Into<Packet>) -> Result<()> {
        self.writer.send(&packet.into()).await?;
        Ok(())
    }

    /// Run the offline-mode login exchange up to join game. Returns the
    /// client's handshake.
    pub async fn login(&mut self) -> Result<Handshake> {
        let Packet::Handshake(handshake) = self.expect("Handshake").await? else {
            return Err(anyhow!("expected a handshake"));
        };
        self.send(EncryptionKeyRequest {
            server_id: "-".into(),
            public_key: vec![0x30, 0x0D],
            verify_token: vec![1, 2, 3, 4],
        })
        .await?;
        self.expect("EncryptionKeyResponse").await?;
        self.send(EncryptionKeyResponse {
            shared_secret: Vec::new(),
            verify_token: Vec::new(),
        })
        .await?;
        match self.expect("ClientStatuses").await? {
            Packet::ClientStatuses(status) if status.payload == 0 => {}
            other => bail!("expected initial spawn status, got {other:?}"),
        }
        self.send(LoginRequest {
            entity_id: MOCK_ENTITY_ID,
            level_type: "flat".into(),
            game_mode: 0,
            dimension: 0,
            difficulty: 1,
            unused: 0,
            max_players: 8,
        })
        .await?;
        Ok(handshake)
    }

    /// Every packet received so far.
    pub fn received(&self) -> &[Packet] {
        &self.received
    }

    /// Keep reading until the client disconnects, then return everything
    /// received over the connection's life.
    pub async fn hold(mut self) -> Result<Vec<Packet>> {
        loop {
            match self.recv().await {
                Ok(Some(_)) => continue,
                Ok(None) => break,
                Err(err) => {
                    debug!(%err, "mock connection ended");
                    break;
                }
            }
        }
        Ok(self.received)
    }
}
