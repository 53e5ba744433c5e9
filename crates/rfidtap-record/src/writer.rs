use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rfidtap_frame::{join_tokens, tokens, HexTokenError};
use thiserror::Error;
use tracing::{debug, info};

use crate::{daily_base_name, next_available_path};

/// Ends every record. Lines carry no trailing `,`, unlike legacy capture logs
/// (`aa,bb,cc,`), so the two are not byte-identical; `read_records` accepts both.
const RECORD_TERMINATOR: &[u8] = b"\n\n";

/// CSV log of raw chunks: one line of comma-separated hex tokens per chunk, each line
/// followed by a blank separator line.
#[derive(Debug)]
pub struct SessionLog<W: Write> {
    sink: BufWriter<W>,
    path: Option<PathBuf>,
    records: u64,
}

impl<W: Write> SessionLog<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink: BufWriter::new(sink),
            path: None,
            records: 0,
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub const fn records(&self) -> u64 {
        self.records
    }

    /// Writes the token line for `chunk` and flushes it.
    pub fn append_chunk(&mut self, chunk: &[u8]) -> Result<(), SessionLogError> {
        let line = join_tokens(&tokens(chunk));
        self.sink.write_all(line.as_bytes())?;
        self.sink.write_all(RECORD_TERMINATOR)?;
        self.flush_boundary()?;
        self.records = self.records.saturating_add(1);
        debug!(record = self.records, tokens = %line, "session log record written");
        Ok(())
    }

    pub fn flush_boundary(&mut self) -> Result<(), SessionLogError> {
        self.sink.flush().map_err(SessionLogError::Io)
    }

    pub fn into_inner(mut self) -> Result<W, SessionLogError> {
        self.flush_boundary()?;
        self.sink
            .into_inner()
            .map_err(|error| SessionLogError::Io(error.into_error()))
    }
}

impl SessionLog<File> {
    /// Opens a fresh log at `<dir>/<base_name>_<YYYY-MM-DD>_<n>.csv`, creating `dir` when
    /// missing. Existing files are never reopened or truncated.
    pub fn create(dir: &Path, base_name: &str, date: NaiveDate) -> Result<Self, SessionLogError> {
        fs::create_dir_all(dir).map_err(|source| SessionLogError::CreateDir {
            path: dir.display().to_string(),
            source,
        })?;

        let base = daily_base_name(base_name, date);
        let path = next_available_path(dir, &base);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|source| SessionLogError::Create {
                path: path.display().to_string(),
                source,
            })?;

        info!(path = %path.display(), "session log opened");
        let mut log = Self::new(file);
        log.path = Some(path);
        Ok(log)
    }

    /// Flushes and closes the file, returning where it lives.
    pub fn close(self) -> Result<Option<PathBuf>, SessionLogError> {
        let path = self.path.clone();
        let records = self.records;
        let file = self.into_inner()?;
        file.sync_all()?;
        if let Some(path) = &path {
            info!(path = %path.display(), records, "session log closed");
        }
        Ok(path)
    }
}

#[derive(Debug, Error)]
pub enum SessionLogError {
    #[error("failed to create log directory `{path}`: {source}")]
    CreateDir { path: String, source: io::Error },

    #[error("failed to create session log `{path}`: {source}")]
    Create { path: String, source: io::Error },

    #[error("session log line {line} is not a hex token record: {source}")]
    MalformedRecord { line: usize, source: HexTokenError },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
