#![warn(missing_docs)]
//! Wire codec, connection state machine and TCP transport for the
//! protocol 61 (1.5.2) game protocol.

pub mod codec;
pub mod error;
pub mod protocol;
pub mod state;
pub mod transport;
pub mod types;
mod wire;

pub use codec::{decode, encode, encode_into, Decoded, FrameDecoder};
pub use error::{CodecError, ProtocolViolation, TransportError};
pub use protocol::{Direction, Packet, PROTOCOL_VERSION};
pub use state::{ConnectionMachine, ConnectionState, Transition};
pub use transport::{connect, split, PacketReader, PacketWriter};
pub use types::{
    BlockRecord, ChunkMeta, EntityMetadata, ExplosionRecord, ItemStack, MetadataEntry,
    MetadataValue, ObjectData, Slot, METADATA_CUSTOM_NAME, METADATA_FLAGS,
};
pub use wire::MAX_ARRAY_LEN;
