//! World store: chunk columns, the block registry, entities and the local
//! player, rebuilt from the server's update stream.

mod blocks;
mod chunk;
mod entity;
mod error;
mod payload;
mod store;

pub use blocks::*;
pub use chunk::*;
pub use entity::*;
pub use error::*;
pub use payload::*;
pub use store::*;
