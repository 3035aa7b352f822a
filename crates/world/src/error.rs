use asciicraft_core::ChunkPos;
use thiserror::Error;

/// Errors that make a chunk update unusable. Fatal to the session.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("chunk payload failed to inflate: {0}")]
    Decompress(#[from] std::io::Error),

    #[error("chunk payload for {chunk} is {actual} bytes, bitmaps require {expected}")]
    PayloadSize {
        chunk: ChunkPos,
        expected: usize,
        actual: usize,
    },

    #[error("chunk bulk payload is {actual} bytes, column headers require {expected}")]
    BulkSize { expected: usize, actual: usize },
}
