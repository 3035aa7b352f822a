//! Error types for the wire codec, connection state machine and transport.

use thiserror::Error;

use crate::protocol::Direction;
use crate::state::ConnectionState;

/// Malformed or undecodable bytes. Fatal to the session that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Packet id is not part of the protocol for this direction.
    #[error("unknown packet id 0x{id:02X} for {direction:?} traffic")]
    UnknownPacket {
        /// Leading id byte.
        id: u8,
        /// Direction the decoder was reading.
        direction: Direction,
    },
    /// A length or count prefix was negative.
    #[error("negative length prefix {0}")]
    NegativeLength(i32),
    /// A length or count prefix exceeded the decoder's limit.
    #[error("length prefix {len} exceeds limit {limit}")]
    LengthTooLarge {
        /// Declared length.
        len: usize,
        /// Configured upper bound.
        limit: usize,
    },
    /// Two prefixes describing the same array disagree.
    #[error("declared size {declared} does not match {expected} implied by record count")]
    LengthMismatch {
        /// Byte size carried on the wire.
        declared: i32,
        /// Size implied by the element count.
        expected: i64,
    },
    /// String payload was not valid UTF-16.
    #[error("string is not valid UTF-16")]
    InvalidString,
    /// Entity metadata entry used a type id outside `0..=6`.
    #[error("unknown entity metadata type {0}")]
    InvalidMetadataType(u8),
    /// Entity metadata entry whose header byte cannot be written: the
    /// index is above 31, or it is a float at index 31, whose header is the
    /// stream terminator.
    #[error("metadata index {index} with type {type_id} cannot be encoded")]
    UnencodableMetadata {
        /// Entry index.
        index: u8,
        /// Value type id.
        type_id: u8,
    },
}

/// A packet that is not legal in the connection's current state.
///
/// The connection transitions to [`ConnectionState::Closed`] when this is
/// raised; there is no recovery because every later byte would be misread.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{packet} ({direction:?}) is not legal in state {state:?}")]
pub struct ProtocolViolation {
    /// State the connection was in when the packet arrived or was queued.
    pub state: ConnectionState,
    /// Packet name.
    pub packet: &'static str,
    /// Direction of travel.
    pub direction: Direction,
}

/// Failure while moving packets over a TCP stream.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Socket level failure.
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
    /// Bytes received could not be decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}
