use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("chunk is empty")]
    Empty,

    #[error("chunk of {actual} bytes is shorter than the 3-byte frame header")]
    TruncatedHeader { actual: usize },

    #[error("frame declares {length} payload bytes and needs {expected} bytes, chunk has {actual}")]
    Truncated {
        length: u8,
        expected: usize,
        actual: usize,
    },

    #[error("payload of {payload_len} bytes cannot be described by a one-byte length field")]
    PayloadTooLong { payload_len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexTokenError {
    #[error("hex token `{token}` must be exactly two characters")]
    BadWidth { token: String },

    #[error("hex token `{token}` contains a non-hex character")]
    NotHex { token: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssembleError {
    #[error("pending buffer of {pending} bytes would exceed max bound of {max_pending_bytes} bytes")]
    PendingOverflow {
        pending: usize,
        max_pending_bytes: usize,
    },
}
