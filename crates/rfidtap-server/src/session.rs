use std::future::Future;
use std::io::Write;

use rfidtap_frame::{decode_chunk, FrameAssembler, FrameError, FrameReport, MessageKind};
use rfidtap_net::{ChunkReadError, ChunkReader, ReadOutcome};
use rfidtap_record::SessionLog;
use tokio::io::AsyncRead;
use tracing::{debug, info, warn};

use crate::{FrameObserver, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The client closed its side of the connection.
    PeerClosed,
    /// Shutdown was requested locally.
    Interrupted,
    /// The client stayed silent for the whole idle timeout.
    IdleTimeout,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub chunks: u64,
    pub frames: u64,
    pub valid: u64,
    pub invalid: u64,
    pub malformed: u64,
    pub overflows: u64,
    pub connection_established: u64,
    pub tag_reads: u64,
    pub heartbeats: u64,
    pub unrecognized: u64,
}

impl SessionSummary {
    fn record_frame(&mut self, report: &FrameReport) {
        self.frames += 1;
        if report.is_valid() {
            self.valid += 1;
        } else {
            self.invalid += 1;
        }

        match report.kind {
            MessageKind::ConnectionEstablished => self.connection_established += 1,
            MessageKind::TagRead => self.tag_reads += 1,
            MessageKind::Heartbeat => self.heartbeats += 1,
            MessageKind::Unrecognized(_) => self.unrecognized += 1,
        }
    }
}

/// One client connection: reads chunks, logs them, decodes them and reports the result.
#[derive(Debug)]
pub struct Session<R, W: Write, O> {
    reader: ChunkReader<R>,
    log: SessionLog<W>,
    observer: O,
    assembler: Option<FrameAssembler>,
    summary: SessionSummary,
}

impl<R, W, O> Session<R, W, O>
where
    W: Write,
{
    pub fn new(reader: ChunkReader<R>, log: SessionLog<W>, observer: O) -> Self {
        Self {
            reader,
            log,
            observer,
            assembler: None,
            summary: SessionSummary::default(),
        }
    }

    /// Splits frames on their length byte instead of treating each read as one frame.
    #[must_use]
    pub fn with_reassembly(mut self, max_pending_bytes: usize) -> Self {
        self.assembler = Some(FrameAssembler::new(max_pending_bytes));
        self
    }

    pub fn into_parts(self) -> (SessionSummary, SessionLog<W>) {
        (self.summary, self.log)
    }
}

impl<R, W, O> Session<R, W, O>
where
    R: AsyncRead + Unpin,
    W: Write,
    O: FrameObserver,
{
    /// Processes chunks until the peer closes, the idle timeout fires or `shutdown`
    /// completes. The session log stays open; take it back with `into_parts`.
    pub async fn run<F>(&mut self, shutdown: F) -> Result<SessionEnd, SessionError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let outcome = tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!("Program terminated by user.");
                    return Ok(SessionEnd::Interrupted);
                }
                outcome = self.reader.read_chunk() => outcome,
            };

            match outcome {
                Ok(ReadOutcome::Chunk(chunk)) => self.handle_chunk(&chunk)?,
                Ok(ReadOutcome::Closed) => {
                    self.drain_pending();
                    info!(
                        chunks = self.reader.chunks_read(),
                        bytes = self.reader.bytes_read(),
                        "Client disconnected"
                    );
                    return Ok(SessionEnd::PeerClosed);
                }
                Err(ChunkReadError::IdleTimeout { idle }) => {
                    self.drain_pending();
                    warn!(?idle, "no data from client, ending session");
                    return Ok(SessionEnd::IdleTimeout);
                }
                Err(error) => return Err(SessionError::Read(error)),
            }
        }
    }

    fn handle_chunk(&mut self, chunk: &[u8]) -> Result<(), SessionError> {
        self.summary.chunks += 1;
        self.log.append_chunk(chunk)?;

        let Some(assembler) = self.assembler.as_mut() else {
            self.dispatch(chunk, decode_chunk(chunk));
            return Ok(());
        };

        let pushed = assembler.push(chunk);
        let mut frames = Vec::new();
        while let Some(frame) = assembler.next_frame() {
            frames.push(frame);
        }
        debug!(
            frames = frames.len(),
            pending = assembler.pending_len(),
            "chunk reassembled"
        );

        for frame in frames {
            self.dispatch(&frame, decode_chunk(&frame));
        }
        if let Err(error) = pushed {
            self.summary.overflows += 1;
            self.observer.on_overflow(&error);
        }
        Ok(())
    }

    fn dispatch(&mut self, bytes: &[u8], decoded: Result<FrameReport, FrameError>) {
        match decoded {
            Ok(report) => {
                self.summary.record_frame(&report);
                self.observer.on_frame(&report);
            }
            Err(error) => {
                self.summary.malformed += 1;
                self.observer.on_malformed(bytes, &error);
            }
        }
    }

    /// Reports a partial frame left in the reassembly buffer when the stream ends.
    fn drain_pending(&mut self) {
        let Some(assembler) = self.assembler.as_mut() else {
            return;
        };

        let pending = assembler.take_pending();
        if !pending.is_empty() {
            self.dispatch(&pending, decode_chunk(&pending));
        }
    }
}
