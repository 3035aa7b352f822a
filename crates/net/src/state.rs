//! Connection state machine.
//!
//! Login sequence for this protocol version:
//!
//! ```text
//! client  Handshake              (Handshake)
//! server  EncryptionKeyRequest   Handshake -> Login
//! client  EncryptionKeyResponse  (empty arrays, offline mode)
//! server  EncryptionKeyResponse
//! client  ClientStatuses(0)
//! server  LoginRequest           Login -> Play
//! ```
//!
//! `Disconnect` is accepted in every live state and moves to `Closed`.

use tracing::{debug, warn};

use crate::error::ProtocolViolation;
use crate::protocol::{Direction, Packet};

/// Phase of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Handshake not yet acknowledged.
    Handshake,
    /// Authenticating.
    Login,
    /// Full packet surface.
    Play,
    /// Terminal.
    Closed,
}

impl ConnectionState {
    /// Short label for the status line.
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Handshake => "handshake",
            ConnectionState::Login => "login",
            ConnectionState::Play => "play",
            ConnectionState::Closed => "closed",
        }
    }
}

/// Result of feeding a legal packet to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// State unchanged.
    Stay,
    /// Moved into the given state.
    Entered(ConnectionState),
}

/// Validates packet order for one connection.
#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    state: ConnectionState,
    handshake_sent: bool,
}

impl Default for ConnectionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionMachine {
    /// A fresh connection in [`ConnectionState::Handshake`].
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Handshake,
            handshake_sent: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Force the terminal state (user close, socket loss).
    pub fn close(&mut self) {
        self.state = ConnectionState::Closed;
    }

    /// Whether `packet` may be received in `state`.
    pub fn inbound_legal(state: ConnectionState, packet: &Packet) -> bool {
        if !packet.travels(Direction::Clientbound) {
            return false;
        }
        match state {
            ConnectionState::Handshake => matches!(
                packet,
                Packet::EncryptionKeyRequest(_) | Packet::Disconnect(_)
            ),
            ConnectionState::Login => matches!(
                packet,
                Packet::EncryptionKeyResponse(_) | Packet::LoginRequest(_) | Packet::Disconnect(_)
            ),
            ConnectionState::Play => !matches!(
                packet,
                Packet::EncryptionKeyRequest(_)
                    | Packet::EncryptionKeyResponse(_)
                    | Packet::LoginRequest(_)
            ),
            ConnectionState::Closed => false,
        }
    }

    /// Whether `packet` may be sent in `state`.
    pub fn outbound_legal(state: ConnectionState, packet: &Packet) -> bool {
        if !packet.travels(Direction::Serverbound) {
            return false;
        }
        match state {
            ConnectionState::Handshake => matches!(packet, Packet::Handshake(_)),
            ConnectionState::Login => matches!(
                packet,
                Packet::EncryptionKeyResponse(_)
                    | Packet::ClientStatuses(_)
                    | Packet::Disconnect(_)
            ),
            ConnectionState::Play => !matches!(
                packet,
                Packet::Handshake(_)
                    | Packet::EncryptionKeyResponse(_)
                    | Packet::ServerListPing(_)
            ),
            ConnectionState::Closed => false,
        }
    }

    /// Validate and apply a received packet.
    pub fn on_inbound(&mut self, packet: &Packet) -> Result<Transition, ProtocolViolation> {
        let premature = self.state == ConnectionState::Handshake && !self.handshake_sent;
        if premature || !Self::inbound_legal(self.state, packet) {
            return Err(self.violation(packet, Direction::Clientbound));
        }
        let next = match (self.state, packet) {
            (_, Packet::Disconnect(_)) => Some(ConnectionState::Closed),
            (ConnectionState::Handshake, Packet::EncryptionKeyRequest(_)) => {
                Some(ConnectionState::Login)
            }
            (ConnectionState::Login, Packet::LoginRequest(_)) => Some(ConnectionState::Play),
            _ => None,
        };
        Ok(self.enter(next))
    }

    /// Validate and apply a packet about to be sent.
    pub fn on_outbound(&mut self, packet: &Packet) -> Result<Transition, ProtocolViolation> {
        let repeated_handshake =
            self.handshake_sent && matches!(packet, Packet::Handshake(_));
        if repeated_handshake || !Self::outbound_legal(self.state, packet) {
            return Err(self.violation(packet, Direction::Serverbound));
        }
        match packet {
            Packet::Handshake(_) => {
                self.handshake_sent = true;
                Ok(Transition::Stay)
            }
            Packet::Disconnect(_) => Ok(self.enter(Some(ConnectionState::Closed))),
            _ => Ok(Transition::Stay),
        }
    }

    fn enter(&mut self, next: Option<ConnectionState>) -> Transition {
        match next {
            Some(state) if state != self.state => {
                debug!(from = ?self.state, to = ?state, "connection state change");
                self.state = state;
                Transition::Entered(state)
            }
            _ => Transition::Stay,
        }
    }

    fn violation(&mut self, packet: &Packet, direction: Direction) -> ProtocolViolation {
        let err = ProtocolViolation {
            state: self.state,
            packet: packet.name(),
            direction,
        };
        warn!(%err, "protocol violation, closing connection");
        self.state = ConnectionState::Closed;
        err
    }
}
