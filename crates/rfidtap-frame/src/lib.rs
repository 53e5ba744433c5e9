mod assembler;
mod error;
mod frame;
mod hex;
mod message;

pub use assembler::FrameAssembler;
pub use error::{AssembleError, FrameError, HexTokenError};
pub use frame::{
    compute_checksum, decode_chunk, ChecksumStatus, Frame, FrameBuilder, FrameReport,
    DEFAULT_HEADER, FRAME_OVERHEAD_BYTES, HEADER_BYTES,
};
pub use hex::{decode_token, encode_token, join_tokens, parse_token_line, tokens};
pub use message::MessageKind;
