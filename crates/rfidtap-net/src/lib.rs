mod chunk;
mod error;

pub use chunk::{ChunkReader, ReadOutcome};
pub use error::ChunkReadError;
