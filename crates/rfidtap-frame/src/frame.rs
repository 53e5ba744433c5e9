//! Reader frame layout:
//!
//! | Field    | Offset     | Size     |
//! |----------|------------|----------|
//! | header   | 0          | 1        |
//! | type     | 1          | 1        |
//! | length   | 2          | 1        |
//! | payload  | 3          | `length` |
//! | checksum | 3 + length | 1        |
//!
//! The checksum is the low byte of the sum of type, length and payload bytes. The header
//! byte is carried but never validated.

use crate::{tokens, FrameError, MessageKind};

/// Header, type and length bytes.
pub const HEADER_BYTES: usize = 3;
/// Header plus the trailing checksum byte; the smallest possible frame.
pub const FRAME_OVERHEAD_BYTES: usize = HEADER_BYTES + 1;
/// Frame start flag sent by the reader.
pub const DEFAULT_HEADER: u8 = 0xBB;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    header: u8,
    type_byte: u8,
    payload: Vec<u8>,
    checksum: u8,
}

impl Frame {
    /// Parses one frame from the start of `chunk`, returning it with the number of bytes
    /// it occupies. Bytes after the checksum are left to the caller.
    pub fn parse(chunk: &[u8]) -> Result<(Self, usize), FrameError> {
        let expected = frame_len(chunk)?;
        if chunk.len() < expected {
            return Err(FrameError::Truncated {
                length: chunk[2],
                expected,
                actual: chunk.len(),
            });
        }

        let payload_end = expected - 1;
        let frame = Self {
            header: chunk[0],
            type_byte: chunk[1],
            payload: chunk[HEADER_BYTES..payload_end].to_vec(),
            checksum: chunk[payload_end],
        };
        Ok((frame, expected))
    }

    #[must_use]
    pub const fn header(&self) -> u8 {
        self.header
    }

    #[must_use]
    pub const fn type_byte(&self) -> u8 {
        self.type_byte
    }

    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        MessageKind::from_type_byte(self.type_byte)
    }

    #[must_use]
    pub fn length(&self) -> u8 {
        // parse and build both cap the payload at u8::MAX bytes
        u8::try_from(self.payload.len()).unwrap_or(u8::MAX)
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    #[must_use]
    pub const fn checksum(&self) -> u8 {
        self.checksum
    }

    #[must_use]
    pub fn computed_checksum(&self) -> u8 {
        compute_checksum(self.type_byte, &self.payload)
    }

    #[must_use]
    pub fn checksum_status(&self) -> ChecksumStatus {
        let computed = self.computed_checksum();
        if computed == self.checksum {
            ChecksumStatus::Valid
        } else {
            ChecksumStatus::Invalid {
                received: self.checksum,
                computed,
            }
        }
    }

    #[must_use]
    pub fn encoded_len(&self) -> usize {
        FRAME_OVERHEAD_BYTES + self.payload.len()
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.encoded_len());
        bytes.push(self.header);
        bytes.push(self.type_byte);
        bytes.push(self.length());
        bytes.extend_from_slice(&self.payload);
        bytes.push(self.checksum);
        bytes
    }
}

/// Total frame size declared by the header of `chunk`.
pub(crate) fn frame_len(chunk: &[u8]) -> Result<usize, FrameError> {
    if chunk.is_empty() {
        return Err(FrameError::Empty);
    }
    if chunk.len() < HEADER_BYTES {
        return Err(FrameError::TruncatedHeader {
            actual: chunk.len(),
        });
    }

    Ok(FRAME_OVERHEAD_BYTES + usize::from(chunk[2]))
}

/// Low byte of `type + length + sum(payload)`.
///
/// The length byte is derived from `payload`, which callers keep at or below 255 bytes.
#[must_use]
pub fn compute_checksum(type_byte: u8, payload: &[u8]) -> u8 {
    let length = payload.len() as u8;
    payload
        .iter()
        .fold(type_byte.wrapping_add(length), |sum, byte| {
            sum.wrapping_add(*byte)
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumStatus {
    Valid,
    Invalid { received: u8, computed: u8 },
}

impl ChecksumStatus {
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Everything learned from one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    pub tokens: Vec<String>,
    pub frame: Frame,
    pub kind: MessageKind,
    pub computed_checksum: u8,
    pub status: ChecksumStatus,
    pub trailing_bytes: usize,
}

impl FrameReport {
    #[must_use]
    pub fn from_frame(frame: Frame, tokens: Vec<String>, trailing_bytes: usize) -> Self {
        Self {
            kind: frame.kind(),
            computed_checksum: frame.computed_checksum(),
            status: frame.checksum_status(),
            tokens,
            frame,
            trailing_bytes,
        }
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.status.is_valid()
    }
}

/// Decodes one chunk as exactly one frame.
///
/// Bytes after the checksum are counted in `trailing_bytes` and otherwise ignored.
pub fn decode_chunk(chunk: &[u8]) -> Result<FrameReport, FrameError> {
    let (frame, consumed) = Frame::parse(chunk)?;
    Ok(FrameReport::from_frame(
        frame,
        tokens(chunk),
        chunk.len() - consumed,
    ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuilder {
    header: u8,
    type_byte: u8,
    payload: Vec<u8>,
}

impl FrameBuilder {
    #[must_use]
    pub const fn new(type_byte: u8) -> Self {
        Self {
            header: DEFAULT_HEADER,
            type_byte,
            payload: Vec::new(),
        }
    }

    #[must_use]
    pub const fn kind(kind: MessageKind) -> Self {
        Self::new(kind.type_byte())
    }

    #[must_use]
    pub const fn header(mut self, header: u8) -> Self {
        self.header = header;
        self
    }

    #[must_use]
    pub fn payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn build(self) -> Result<Frame, FrameError> {
        if self.payload.len() > usize::from(u8::MAX) {
            return Err(FrameError::PayloadTooLong {
                payload_len: self.payload.len(),
            });
        }

        let checksum = compute_checksum(self.type_byte, &self.payload);
        Ok(Frame {
            header: self.header,
            type_byte: self.type_byte,
            payload: self.payload,
            checksum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{compute_checksum, decode_chunk, ChecksumStatus, Frame, FrameBuilder};
    use crate::{FrameError, MessageKind};

    #[test]
    fn tag_read_frame_decodes_and_validates() {
        let report = decode_chunk(&[0x02, 0x17, 0x02, 0xAB, 0xCD, 0x91]).expect("valid frame");

        assert_eq!(report.frame.header(), 0x02);
        assert_eq!(report.kind, MessageKind::TagRead);
        assert_eq!(report.frame.length(), 2);
        assert_eq!(report.frame.payload(), &[0xAB, 0xCD]);
        assert_eq!(report.computed_checksum, 0x91);
        assert_eq!(report.status, ChecksumStatus::Valid);
        assert_eq!(report.tokens, ["02", "17", "02", "ab", "cd", "91"]);
        assert_eq!(report.trailing_bytes, 0);
    }

    #[test]
    fn checksum_covers_type_length_and_payload_only() {
        assert_eq!(compute_checksum(0x17, &[0xAB, 0xCD]), 0x91);
        assert_eq!(compute_checksum(0x40, &[]), 0x40);

        let with_other_header =
            decode_chunk(&[0xFF, 0x17, 0x02, 0xAB, 0xCD, 0x91]).expect("valid frame");
        assert!(with_other_header.is_valid());
    }

    #[test]
    fn mismatched_checksum_reports_both_values() {
        let report = decode_chunk(&[0xBB, 0x40, 0x00, 0x41]).expect("well-formed frame");
        assert_eq!(
            report.status,
            ChecksumStatus::Invalid {
                received: 0x41,
                computed: 0x40,
            }
        );
        assert!(!report.is_valid());
    }

    #[test]
    fn rejects_empty_and_short_chunks() {
        assert_eq!(decode_chunk(&[]), Err(FrameError::Empty));
        assert_eq!(
            decode_chunk(&[0xBB, 0x17]),
            Err(FrameError::TruncatedHeader { actual: 2 })
        );
        assert_eq!(
            decode_chunk(&[0xBB, 0x17, 0x03, 0x01, 0x02]),
            Err(FrameError::Truncated {
                length: 3,
                expected: 7,
                actual: 5,
            })
        );
        // payload present but checksum byte missing
        assert_eq!(
            decode_chunk(&[0xBB, 0x17, 0x01, 0x01]),
            Err(FrameError::Truncated {
                length: 1,
                expected: 5,
                actual: 4,
            })
        );
    }

    #[test]
    fn extra_bytes_after_checksum_are_counted_not_parsed() {
        let report = decode_chunk(&[0xBB, 0x40, 0x00, 0x40, 0x0D, 0x0A]).expect("valid frame");
        assert!(report.is_valid());
        assert_eq!(report.trailing_bytes, 2);
        assert_eq!(report.tokens.len(), 6);
    }

    #[test]
    fn builder_computes_checksum_and_encodes() {
        let frame = FrameBuilder::kind(MessageKind::TagRead)
            .header(0x02)
            .payload(vec![0xAB, 0xCD])
            .build()
            .expect("payload fits");
        assert_eq!(frame.encode(), [0x02, 0x17, 0x02, 0xAB, 0xCD, 0x91]);

        let (parsed, consumed) = Frame::parse(&frame.encode()).expect("encoded frame parses");
        assert_eq!(parsed, frame);
        assert_eq!(consumed, 6);
    }

    #[test]
    fn builder_rejects_payload_longer_than_length_field() {
        let error = FrameBuilder::new(0x17)
            .payload(vec![0; 256])
            .build()
            .expect_err("256 bytes cannot be described");
        assert_eq!(error, FrameError::PayloadTooLong { payload_len: 256 });
    }

    #[test]
    fn builder_accepts_maximum_payload() {
        let frame = FrameBuilder::new(0x17)
            .payload(vec![0x01; 255])
            .build()
            .expect("255 bytes fit");
        let report = decode_chunk(&frame.encode()).expect("max frame decodes");
        assert_eq!(report.frame.length(), 255);
        assert!(report.is_valid());
    }
}
