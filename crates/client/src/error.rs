//! Session-fatal errors.

use std::io;

use asciicraft_net::{CodecError, ProtocolViolation, TransportError};
use asciicraft_world::WorldError;
use thiserror::Error;

/// Why a session ended or could not be opened. Every variant is fatal to
/// the one session it came from and to nothing else.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Address is not `host[:port]`.
    #[error("invalid server address `{0}`")]
    InvalidAddress(String),
    /// Socket failure or the peer vanished.
    #[error("connection failed: {0}")]
    Connectivity(#[source] io::Error),
    /// The server did not answer in time.
    #[error("connection timed out")]
    Timeout,
    /// Bytes from the server could not be decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The server sent a packet that is not legal in the current state.
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),
    /// A chunk payload did not match its declared layout.
    #[error(transparent)]
    World(#[from] WorldError),
    /// The server closed the session with a reason.
    #[error("kicked: {0}")]
    Kicked(String),
    /// The server wants an encrypted session.
    #[error("server requires encryption, which this client does not support")]
    EncryptionUnsupported,
}

impl From<io::Error> for SessionError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut => SessionError::Timeout,
            _ => SessionError::Connectivity(err),
        }
    }
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Io(err) => err.into(),
            TransportError::Codec(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_are_told_apart() {
        let err: SessionError = io::Error::new(io::ErrorKind::TimedOut, "slow").into();
        assert!(matches!(err, SessionError::Timeout));
        let err: SessionError = io::Error::new(io::ErrorKind::ConnectionReset, "gone").into();
        assert!(matches!(err, SessionError::Connectivity(_)));
    }
}
