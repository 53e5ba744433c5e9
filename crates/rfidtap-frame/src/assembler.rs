use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};

use crate::frame::{frame_len, HEADER_BYTES};
use crate::AssembleError;

/// Rebuilds frames from a byte stream whose read boundaries do not line up with frame
/// boundaries, using the length byte each frame carries.
#[derive(Debug)]
pub struct FrameAssembler {
    pending: BytesMut,
    ready: VecDeque<Bytes>,
    max_pending_bytes: usize,
}

impl FrameAssembler {
    #[must_use]
    pub fn new(max_pending_bytes: usize) -> Self {
        Self {
            pending: BytesMut::with_capacity(max_pending_bytes.min(64 * 1024)),
            ready: VecDeque::new(),
            max_pending_bytes,
        }
    }

    /// Bytes of the incomplete frame still waiting for more input.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Appends bytes read from the stream and splits off every frame they complete.
    ///
    /// The bound applies to the incomplete tail only. When that tail exceeds it, the tail
    /// is discarded so the assembler resynchronises on the next read; frames already
    /// completed stay available from `next_frame`.
    pub fn push(&mut self, chunk: &[u8]) -> Result<(), AssembleError> {
        self.pending.extend_from_slice(chunk);
        while let Some(frame) = self.split_complete() {
            self.ready.push_back(frame);
        }

        let pending = self.pending.len();
        if pending > self.max_pending_bytes {
            self.pending.clear();
            return Err(AssembleError::PendingOverflow {
                pending,
                max_pending_bytes: self.max_pending_bytes,
            });
        }

        Ok(())
    }

    /// Next complete frame, oldest first.
    pub fn next_frame(&mut self) -> Option<Bytes> {
        self.ready.pop_front()
    }

    /// Drops and returns whatever partial frame is still buffered.
    pub fn take_pending(&mut self) -> Bytes {
        self.pending.split().freeze()
    }

    fn split_complete(&mut self) -> Option<Bytes> {
        if self.pending.len() < HEADER_BYTES {
            return None;
        }

        let expected = frame_len(&self.pending).ok()?;
        if self.pending.len() < expected {
            return None;
        }

        Some(self.pending.split_to(expected).freeze())
    }
}
