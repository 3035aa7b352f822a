//! One server connection: its network task, world, camera and controller.
//!
//! The network task is the only writer of the session's [`World`]; the UI
//! side reads it under a coarse lock and talks back through an outbound
//! queue, so input handling never waits on a socket.

use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use asciicraft_camera::CameraState;
use asciicraft_core::BlockPos;
use asciicraft_input::Action;
use asciicraft_net::protocol::Handshake;
use asciicraft_net::{
    connect, ConnectionMachine, ConnectionState, Packet, PacketReader, PacketWriter, Transition,
    PROTOCOL_VERSION,
};
use asciicraft_render::{render, Frame, ProjectionConfig, StatusLine, View};
use asciicraft_world::World;
use glam::IVec3;
use parking_lot::{RwLock, RwLockReadGuard};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::dispatch::apply_inbound;
use crate::error::SessionError;
use crate::movement::{examine, MovementConfig, MovementController};
use crate::outcome::{InputOutcome, Rejection};

/// Port used when an address does not name one.
pub const DEFAULT_PORT: u16 = 25565;

/// Identifies a session for the lifetime of the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u32);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a session as seen from the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// The connection is live in this state.
    Connected(ConnectionState),
    /// The network task has ended; `reason` is set when it ended on an error.
    Closed { reason: Option<String> },
}

impl SessionStatus {
    pub fn is_closed(&self) -> bool {
        matches!(self, SessionStatus::Closed { .. })
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, SessionStatus::Connected(ConnectionState::Play))
    }

    /// Short label for the status line.
    pub fn label(&self) -> String {
        match self {
            SessionStatus::Connected(state) => state.label().to_string(),
            SessionStatus::Closed { reason: Some(reason) } => format!("closed: {reason}"),
            SessionStatus::Closed { reason: None } => "closed".to_string(),
        }
    }
}

/// Per-session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name sent in the handshake.
    pub username: String,
    /// Upper bound on the TCP connect.
    pub connect_timeout: Duration,
    pub movement: MovementConfig,
    /// Depth limit for examine, matching the renderer's.
    pub max_depth: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            username: "Player".to_string(),
            connect_timeout: Duration::from_millis(5000),
            movement: MovementConfig::default(),
            max_depth: ProjectionConfig::default().max_depth,
        }
    }
}

/// Split `host[:port]`.
pub fn parse_address(address: &str) -> Result<(String, u16), SessionError> {
    let invalid = || SessionError::InvalidAddress(address.to_string());
    let (host, port) = match address.rsplit_once(':') {
        Some((host, port)) => (host, port.parse::<u16>().map_err(|_| invalid())?),
        None => (address, DEFAULT_PORT),
    };
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(invalid());
    }
    Ok((host.to_string(), port))
}

/// Handle to a live or finished session.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    name: String,
    world: Arc<RwLock<World>>,
    status: watch::Receiver<SessionStatus>,
    outbound: mpsc::UnboundedSender<Queued>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
    controller: MovementController,
    camera: CameraState,
    examine: Option<String>,
    max_depth: u8,
}

impl Session {
    /// Connect, send the handshake and start the network task.
    pub async fn open(
        id: SessionId,
        address: &str,
        config: &SessionConfig,
    ) -> Result<Self, SessionError> {
        let (host, port) = parse_address(address)?;
        info!(session = %id, %host, port, "connecting");
        let (reader, mut writer) = connect(&format!("{host}:{port}"), config.connect_timeout).await?;

        let mut machine = ConnectionMachine::new();
        let handshake = Packet::from(Handshake {
            protocol_version: PROTOCOL_VERSION,
            username: config.username.clone(),
            host: host.clone(),
            port: i32::from(port),
        });
        machine.on_outbound(&handshake)?;
        writer.send(&handshake).await?;

        let world = Arc::new(RwLock::new(World::default()));
        let (status_tx, status_rx) = watch::channel(SessionStatus::Connected(machine.state()));
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let link = Link {
            id,
            reader,
            writer,
            machine,
            world: Arc::clone(&world),
            status: status_tx,
        };
        let task = tokio::spawn(link.run(outbound_rx, shutdown_rx));

        Ok(Self {
            id,
            name: format!("{}@{host}:{port}", config.username),
            world,
            status: status_rx,
            outbound: outbound_tx,
            shutdown: shutdown_tx,
            task,
            controller: MovementController::new(config.movement),
            camera: CameraState::new(),
            examine: None,
            max_depth: config.max_depth,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// `user@host:port`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    /// Receiver that is notified on every status change.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    /// Read access to the world. Do not hold the guard across an await.
    pub fn world(&self) -> RwLockReadGuard<'_, World> {
        self.world.read()
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    /// Text of the last examine.
    pub fn last_examine(&self) -> Option<&str> {
        self.examine.as_deref()
    }

    /// Voxel the view is centred on, once the player position is known.
    pub fn view_origin(&self) -> Option<BlockPos> {
        let world = self.world.read();
        self.origin_in(&world)
    }

    fn origin_in(&self, world: &World) -> Option<BlockPos> {
        let feet = self.controller.feet(world).ok()?;
        Some(self.camera.view_origin(feet))
    }

    /// Queue `packet`, built while the world had seen `epoch` server
    /// corrections.
    fn enqueue(&self, epoch: u64, packet: Packet) {
        if self.outbound.send(Queued { packet, epoch }).is_err() {
            debug!(session = %self.id, "outbound queue closed, packet dropped");
        }
    }

    /// Apply one input action to this session.
    pub fn handle(&mut self, action: Action) -> InputOutcome {
        if !self.status().is_playing() {
            return Rejection::NotPlaying.into();
        }
        let shared = Arc::clone(&self.world);
        let world = shared.read();
        let looking = self.camera.is_looking();
        let epoch = world.player().corrections;
        let result = match action {
            Action::ToggleLook => Ok(InputOutcome::CameraMode(self.camera.toggle_look())),
            Action::Step(direction) if looking => {
                let (dx, dz) = direction.delta();
                self.pan(&world, IVec3::new(dx, 0, dz))
            }
            Action::Ascend if looking => self.pan(&world, IVec3::Y),
            Action::Descend if looking => self.pan(&world, IVec3::NEG_Y),
            Action::Step(direction) => self
                .controller
                .step(&world, direction)
                .map(|(to, packet)| {
                    self.enqueue(epoch, packet);
                    InputOutcome::Moved(to)
                }),
            Action::Ascend => self.controller.ascend(&world).map(|(to, packet)| {
                self.enqueue(epoch, packet);
                InputOutcome::Moved(to)
            }),
            Action::Descend => self.controller.descend(&world).map(|(to, packet)| {
                self.enqueue(epoch, packet);
                InputOutcome::Moved(to)
            }),
            Action::Dig(direction) => self.controller.dig(&world, direction).map(|(target, packets)| {
                packets.into_iter().for_each(|packet| self.enqueue(epoch, packet));
                InputOutcome::Dug(target)
            }),
            Action::Examine => match self.origin_in(&world) {
                Some(target) => {
                    let text = examine(&world, target, self.max_depth);
                    self.examine = Some(text.clone());
                    Ok(InputOutcome::Examined(text))
                }
                None => Err(Rejection::NoPosition),
            },
            Action::NextSession | Action::FocusSession(_) | Action::CloseSession | Action::Quit => {
                Err(Rejection::NoSession)
            }
        };
        result.unwrap_or_else(InputOutcome::Rejected)
    }

    fn pan(&mut self, world: &World, delta: IVec3) -> Result<InputOutcome, Rejection> {
        let feet = self.controller.feet(world)?;
        if self.camera.pan(delta) {
            Ok(InputOutcome::Panned(self.camera.view_origin(feet)))
        } else {
            Err(Rejection::CameraLimit)
        }
    }

    /// Queue the periodic position packet. Does nothing before play or
    /// while the position is unknown.
    pub fn heartbeat(&self) {
        if !self.status().is_playing() {
            return;
        }
        let world = self.world.read();
        if let Some(packet) = self.controller.heartbeat(&world) {
            self.enqueue(world.player().corrections, packet);
        }
    }

    /// Render this session's view with its status line.
    pub fn render(
        &self,
        width: usize,
        height: usize,
        projection: &ProjectionConfig,
        index: usize,
        count: usize,
    ) -> Frame {
        let world = self.world.read();
        let view = View {
            origin: self.origin_in(&world).unwrap_or(BlockPos::ORIGIN),
            width,
            height,
            looking: self.camera.is_looking(),
            player: self.controller.feet(&world).ok(),
        };
        let mut frame = render(&world, &view, projection);
        let mut status =
            StatusLine::for_world(index, count, self.name.as_str(), self.status().label(), &world);
        status.looking = view.looking;
        status.position = view.player;
        frame.status = status.to_string();
        frame.examine = self.examine.clone();
        frame
    }

    /// Ask the network task to stop. The returned handle completes once the
    /// socket is released.
    pub fn close(self) -> JoinHandle<()> {
        info!(session = %self.id, "closing session");
        // The task also stops when the sender is dropped, so a send error
        // only means it is already gone.
        let _ = self.shutdown.send(true);
        self.task
    }
}

/// A packet from the UI side, stamped with the number of server
/// corrections the world had seen when it was built.
#[derive(Debug)]
struct Queued {
    packet: Packet,
    epoch: u64,
}

/// The network half of a session.
struct Link {
    id: SessionId,
    reader: PacketReader,
    writer: PacketWriter,
    machine: ConnectionMachine,
    world: Arc<RwLock<World>>,
    status: watch::Sender<SessionStatus>,
}

impl Link {
    async fn run(
        mut self,
        mut outbound: mpsc::UnboundedReceiver<Queued>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let reason = match self.pump(&mut outbound, &mut shutdown).await {
            Ok(()) => None,
            Err(err) => {
                warn!(session = %self.id, %err, "session ended");
                Some(err.to_string())
            }
        };
        self.machine.close();
        if let Err(err) = self.writer.shutdown().await {
            debug!(session = %self.id, %err, "socket shutdown failed");
        }
        self.status.send_replace(SessionStatus::Closed { reason });
    }

    async fn pump(
        &mut self,
        outbound: &mut mpsc::UnboundedReceiver<Queued>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(), SessionError> {
        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!(session = %self.id, "shutdown requested");
                        return Ok(());
                    }
                }
                inbound = self.reader.next() => match inbound? {
                    Some(packet) => self.receive(packet).await?,
                    None => {
                        return Err(SessionError::Connectivity(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "server closed the connection",
                        )));
                    }
                },
                Some(queued) = outbound.recv() => {
                    if self.machine.state() != ConnectionState::Play {
                        debug!(session = %self.id, packet = queued.packet.name(), "not in play, dropping queued packet");
                    } else if self.is_stale(&queued) {
                        debug!(session = %self.id, epoch = queued.epoch, "position predates a server correction, dropping");
                    } else {
                        self.send(queued.packet).await?;
                    }
                }
            }
        }
    }

    async fn receive(&mut self, packet: Packet) -> Result<(), SessionError> {
        let transition = self.machine.on_inbound(&packet)?;
        let replies = {
            let mut world = self.world.write();
            apply_inbound(&mut world, packet)?
        };
        if let Transition::Entered(state) = transition {
            info!(session = %self.id, state = state.label(), "connection state");
            self.status.send_replace(SessionStatus::Connected(state));
        }
        if replies.is_empty() {
            return Ok(());
        }
        for reply in &replies {
            self.machine.on_outbound(reply)?;
        }
        self.writer.send_all(&replies).await?;
        Ok(())
    }

    /// A queued position computed before the latest server correction.
    /// The server's word stands; the prediction it was built on is gone.
    fn is_stale(&self, queued: &Queued) -> bool {
        matches!(queued.packet, Packet::PositionAndLook(_))
            && queued.epoch != self.world.read().player().corrections
    }

    async fn send(&mut self, packet: Packet) -> Result<(), SessionError> {
        self.machine.on_outbound(&packet)?;
        self.writer.send(&packet).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asciicraft_net::protocol::{
        ClientStatuses, EncryptionKeyRequest, EncryptionKeyResponse, LoginRequest,
        PlayerDigging, PositionAndLook, ServerPositionAndLook,
    };
    use asciicraft_net::{split, Direction};
    use tokio::net::{TcpListener, TcpStream};

    /// A link already in play, with the server's halves of the socket.
    async fn playing_link() -> (Link, Arc<RwLock<World>>, PacketReader, PacketWriter) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).await.unwrap();
        let (server, _) = listener.accept().await.unwrap();
        let (reader, writer) = split(client, Direction::Clientbound);
        let (server_rx, server_tx) = split(server, Direction::Serverbound);

        let mut machine = ConnectionMachine::new();
        let empty_keys = EncryptionKeyResponse {
            shared_secret: Vec::new(),
            verify_token: Vec::new(),
        };
        machine
            .on_outbound(&Packet::from(Handshake {
                protocol_version: PROTOCOL_VERSION,
                username: "tester".into(),
                host: "localhost".into(),
                port: 25565,
            }))
            .unwrap();
        machine
            .on_inbound(&Packet::from(EncryptionKeyRequest {
                server_id: "-".into(),
                public_key: Vec::new(),
                verify_token: Vec::new(),
            }))
            .unwrap();
        machine.on_outbound(&Packet::from(empty_keys.clone())).unwrap();
        machine.on_inbound(&Packet::from(empty_keys)).unwrap();
        machine
            .on_outbound(&Packet::from(ClientStatuses { payload: 0 }))
            .unwrap();
        machine
            .on_inbound(&Packet::from(LoginRequest {
                entity_id: 7,
                level_type: "flat".into(),
                game_mode: 0,
                dimension: 0,
                difficulty: 1,
                unused: 0,
                max_players: 8,
            }))
            .unwrap();
        assert_eq!(machine.state(), ConnectionState::Play);

        let world = Arc::new(RwLock::new(World::default()));
        let (status, _) = watch::channel(SessionStatus::Connected(ConnectionState::Play));
        let link = Link {
            id: SessionId(1),
            reader,
            writer,
            machine,
            world: Arc::clone(&world),
            status,
        };
        (link, world, server_rx, server_tx)
    }

    fn position(x: f64, y: f64, z: f64) -> Packet {
        Packet::from(PositionAndLook {
            x,
            y,
            stance: y + 1.62,
            z,
            yaw: 0.0,
            pitch: 0.0,
            on_ground: true,
        })
    }

    #[tokio::test]
    async fn positions_queued_before_a_correction_are_dropped() {
        let (link, world, mut server_rx, mut server_tx) = playing_link().await;
        let (queue, outbound) = mpsc::unbounded_channel();
        let (stop, shutdown) = watch::channel(false);
        let task = tokio::spawn(link.run(outbound, shutdown));

        server_tx
            .send(&Packet::from(ServerPositionAndLook {
                x: 100.5,
                stance: 71.62,
                y: 70.0,
                z: 100.5,
                yaw: 0.0,
                pitch: 0.0,
                on_ground: true,
            }))
            .await
            .unwrap();
        match server_rx.next().await.unwrap() {
            Some(Packet::PositionAndLook(echo)) => assert_eq!((echo.x, echo.y), (100.5, 70.0)),
            other => panic!("expected the correction echo, got {other:?}"),
        }
        assert_eq!(world.read().player().corrections, 1);

        let stale = Queued {
            packet: position(0.5, 64.0, 0.5),
            epoch: 0,
        };
        let dig = Queued {
            packet: Packet::from(PlayerDigging {
                status: 0,
                x: 1,
                y: 64,
                z: 0,
                face: 1,
            }),
            epoch: 0,
        };
        let fresh = Queued {
            packet: position(101.5, 70.0, 100.5),
            epoch: 1,
        };
        for queued in [stale, dig, fresh] {
            queue.send(queued).unwrap();
        }

        assert!(matches!(
            server_rx.next().await.unwrap(),
            Some(Packet::PlayerDigging(_))
        ));
        match server_rx.next().await.unwrap() {
            Some(Packet::PositionAndLook(sent)) => assert_eq!((sent.x, sent.z), (101.5, 100.5)),
            other => panic!("expected the fresh position, got {other:?}"),
        }

        // Sent positions never overwrite what the server last confirmed.
        let confirmed = world.read().player().position.unwrap();
        assert_eq!((confirmed.x, confirmed.y, confirmed.z), (100.5, 70.0, 100.5));

        stop.send(true).unwrap();
        task.await.unwrap();
    }

    #[test]
    fn addresses_default_the_port() {
        assert_eq!(
            parse_address("example.org").unwrap(),
            ("example.org".to_string(), DEFAULT_PORT)
        );
        assert_eq!(
            parse_address("127.0.0.1:25570").unwrap(),
            ("127.0.0.1".to_string(), 25570)
        );
        assert!(parse_address(":25565").is_err());
        assert!(parse_address("host:port").is_err());
        assert!(parse_address("host:70000").is_err());
    }

    #[test]
    fn status_labels() {
        assert_eq!(SessionStatus::Connected(ConnectionState::Play).label(), "play");
        assert_eq!(SessionStatus::Closed { reason: None }.label(), "closed");
        let kicked = SessionStatus::Closed {
            reason: Some("kicked: bye".into()),
        };
        assert_eq!(kicked.label(), "closed: kicked: bye");
        assert!(kicked.is_closed());
    }
}
