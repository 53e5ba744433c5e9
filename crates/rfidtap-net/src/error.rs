use std::io;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChunkReadError {
    #[error("no bytes received for {idle:?}")]
    IdleTimeout { idle: Duration },

    #[error("read buffer size must be greater than zero")]
    ZeroReadBuffer,

    #[error("I/O error: {0}")]
    Io(#[source] io::Error),
}
