use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::ChunkReadError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// One transport read worth of bytes; never empty.
    Chunk(Vec<u8>),
    /// The peer shut down its side of the stream.
    Closed,
}

/// Reads a stream one transport read at a time into a reusable, fixed-size buffer.
///
/// `read_chunk` is cancel safe: dropping its future before completion loses no bytes, so
/// it can sit in a `tokio::select!` next to a shutdown signal.
#[derive(Debug)]
pub struct ChunkReader<R> {
    inner: R,
    buffer: Vec<u8>,
    idle_timeout: Option<Duration>,
    chunks_read: u64,
    bytes_read: u64,
}

impl<R> ChunkReader<R> {
    pub fn new(inner: R, max_read_bytes: usize) -> Result<Self, ChunkReadError> {
        if max_read_bytes == 0 {
            return Err(ChunkReadError::ZeroReadBuffer);
        }

        Ok(Self {
            inner,
            buffer: vec![0_u8; max_read_bytes],
            idle_timeout: None,
            chunks_read: 0,
            bytes_read: 0,
        })
    }

    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = Some(idle_timeout);
        self
    }

    #[must_use]
    pub const fn chunks_read(&self) -> u64 {
        self.chunks_read
    }

    #[must_use]
    pub const fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

impl<R> ChunkReader<R>
where
    R: AsyncRead + Unpin,
{
    pub async fn read_chunk(&mut self) -> Result<ReadOutcome, ChunkReadError> {
        let read = match self.idle_timeout {
            Some(idle) => tokio::time::timeout(idle, self.inner.read(&mut self.buffer))
                .await
                .map_err(|_| ChunkReadError::IdleTimeout { idle })?,
            None => self.inner.read(&mut self.buffer).await,
        }
        .map_err(ChunkReadError::Io)?;

        if read == 0 {
            return Ok(ReadOutcome::Closed);
        }

        self.chunks_read = self.chunks_read.saturating_add(1);
        self.bytes_read = self.bytes_read.saturating_add(read as u64);
        Ok(ReadOutcome::Chunk(self.buffer[..read].to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::{duplex, AsyncWriteExt};

    use super::{ChunkReader, ReadOutcome};
    use crate::ChunkReadError;

    #[tokio::test]
    async fn returns_bytes_of_one_read_then_closed() {
        let (mut writer, reader) = duplex(64);
        writer
            .write_all(&[0xBB, 0x40, 0x00, 0x40])
            .await
            .expect("write should work");
        drop(writer);

        let mut chunks = ChunkReader::new(reader, 1024).expect("non-zero buffer");
        let first = chunks.read_chunk().await.expect("read should succeed");
        assert_eq!(first, ReadOutcome::Chunk(vec![0xBB, 0x40, 0x00, 0x40]));
        let second = chunks.read_chunk().await.expect("read should succeed");
        assert_eq!(second, ReadOutcome::Closed);
        assert_eq!(chunks.chunks_read(), 1);
        assert_eq!(chunks.bytes_read(), 4);
    }

    #[tokio::test]
    async fn caps_each_read_at_buffer_size() {
        let (mut writer, reader) = duplex(64);
        writer
            .write_all(b"abcdefgh")
            .await
            .expect("write should work");
        drop(writer);

        let mut chunks = ChunkReader::new(reader, 5).expect("non-zero buffer");
        assert_eq!(
            chunks.read_chunk().await.expect("first read"),
            ReadOutcome::Chunk(b"abcde".to_vec())
        );
        assert_eq!(
            chunks.read_chunk().await.expect("second read"),
            ReadOutcome::Chunk(b"fgh".to_vec())
        );
    }

    #[tokio::test]
    async fn silent_peer_trips_idle_timeout() {
        let (_writer, reader) = duplex(64);
        let mut chunks = ChunkReader::new(reader, 16)
            .expect("non-zero buffer")
            .with_idle_timeout(Duration::from_millis(20));

        let error = chunks.read_chunk().await.expect_err("peer never writes");
        match error {
            ChunkReadError::IdleTimeout { idle } => assert_eq!(idle, Duration::from_millis(20)),
            _ => panic!("unexpected error variant"),
        }
    }

    #[test]
    fn rejects_zero_sized_buffer() {
        let (_writer, reader) = duplex(8);
        let error = ChunkReader::new(reader, 0).expect_err("zero buffer is invalid");
        assert!(matches!(error, ChunkReadError::ZeroReadBuffer));
    }
}
