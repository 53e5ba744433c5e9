use std::io;
use std::net::SocketAddr;

use rfidtap_config::ConfigError;
use rfidtap_net::ChunkReadError;
use rfidtap_record::SessionLogError;
use thiserror::Error;

/// Setup and lifecycle failures. Everything here ends the process.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error("socket creation failed: {source}")]
    Socket { source: io::Error },

    #[error("setting socket options failed: {source}")]
    SocketOption { source: io::Error },

    #[error("binding {addr} failed: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("listening on {addr} failed: {source}")]
    Listen { addr: SocketAddr, source: io::Error },

    #[error("accept failed: {source}")]
    Accept { source: io::Error },

    #[error(transparent)]
    Reader(#[from] ChunkReadError),

    #[error(transparent)]
    Log(#[from] SessionLogError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Failures that end a running session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("read failed: {0}")]
    Read(#[source] ChunkReadError),

    #[error("session log write failed: {0}")]
    Log(#[from] SessionLogError),
}
