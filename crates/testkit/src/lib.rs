#![warn(missing_docs)]
//! Test surfaces: a scripted protocol 61 server and chunk payload builders.

mod chunks;
mod mock;

pub use chunks::{world_from, ChunkBuilder};
pub use mock::{MockConnection, MockServer, MOCK_ENTITY_ID};
