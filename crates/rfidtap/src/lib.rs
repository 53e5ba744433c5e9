use thiserror::Error;

pub use rfidtap_config as config;
pub use rfidtap_frame as frame;
pub use rfidtap_net as net;
pub use rfidtap_record as record;
pub use rfidtap_server as server;

pub mod prelude {
    pub use rfidtap_config::{FramingMode, Limits, LimitsError, RfidtapConfig};
    pub use rfidtap_frame::{
        decode_chunk, ChecksumStatus, Frame, FrameBuilder, FrameError, FrameReport, MessageKind,
    };
    pub use rfidtap_net::{ChunkReader, ReadOutcome};
    pub use rfidtap_record::SessionLog;
    pub use rfidtap_server::{
        serve_one, ConsoleObserver, FrameObserver, Listener, ServeReport, Session, SessionEnd,
        SessionSummary,
    };
}

pub type Result<T> = std::result::Result<T, RfidtapError>;

#[derive(Debug, Error)]
pub enum RfidtapError {
    #[error(transparent)]
    Frame(#[from] rfidtap_frame::FrameError),
    #[error(transparent)]
    HexToken(#[from] rfidtap_frame::HexTokenError),
    #[error(transparent)]
    Assemble(#[from] rfidtap_frame::AssembleError),
    #[error(transparent)]
    Read(#[from] rfidtap_net::ChunkReadError),
    #[error(transparent)]
    Log(#[from] rfidtap_record::SessionLogError),
    #[error(transparent)]
    Limits(#[from] rfidtap_config::LimitsError),
    #[error(transparent)]
    Config(#[from] rfidtap_config::ConfigError),
    #[error(transparent)]
    Server(#[from] rfidtap_server::ServerError),
    #[error(transparent)]
    Session(#[from] rfidtap_server::SessionError),
}
