use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

mod limits;
mod schema;

pub use limits::{Limits, LimitsError};
pub use schema::{json_schema, parse_duration};

use schema::RfidtapConfigDocument;

pub const DEFAULT_PORT: u16 = 6000;
pub const DEFAULT_BACKLOG: u32 = 3;
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_LOG_DIRECTORY: &str = "data_logs";
pub const DEFAULT_LOG_BASE_NAME: &str = "client_data_log";

/// Top-level typed configuration contract.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RfidtapConfig {
    pub listener: ListenerConfig,
    pub limits: Limits,
    pub session_log: SessionLogConfig,
    pub logging: LoggingConfig,
}

impl RfidtapConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let document: RfidtapConfigDocument =
            serde_yaml::from_str(text).map_err(ConfigError::ParseConfig)?;
        let config = Self::try_from(document)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(&RfidtapConfigDocument::from(self))
            .map_err(ConfigError::SerializeConfig)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listener.validate()?;
        self.limits.validate()?;
        self.session_log.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerConfig {
    pub bind: SocketAddr,
    pub backlog: u32,
    pub idle_timeout: Duration,
    pub framing: FramingMode,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            backlog: DEFAULT_BACKLOG,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            framing: FramingMode::ReadBoundary,
        }
    }
}

impl ListenerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.backlog == 0 {
            return Err(ConfigError::ZeroBacklog);
        }
        if self.idle_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration {
                field: "listener.idle_timeout",
            });
        }
        Ok(())
    }
}

/// How transport reads map onto frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramingMode {
    /// Every read is treated as exactly one frame.
    #[default]
    ReadBoundary,
    /// Reads are buffered and split on the frame length byte.
    Reassemble,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLogConfig {
    pub directory: PathBuf,
    pub base_name: String,
}

impl Default for SessionLogConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
            base_name: DEFAULT_LOG_BASE_NAME.to_owned(),
        }
    }
}

impl SessionLogConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.directory.as_os_str().is_empty() {
            return Err(ConfigError::EmptyLogDirectory);
        }
        if self.base_name.trim().is_empty() {
            return Err(ConfigError::EmptyLogBaseName);
        }
        if self.base_name.contains(['/', '\\']) {
            return Err(ConfigError::LogBaseNameHasSeparator {
                base_name: self.base_name.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    #[must_use]
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
    Compact,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ParseConfig(#[source] serde_yaml::Error),

    #[error("failed to serialize config: {0}")]
    SerializeConfig(#[source] serde_yaml::Error),

    #[error(transparent)]
    InvalidLimits(#[from] LimitsError),

    #[error("{field} must be a socket address, got `{value}`")]
    InvalidAddress { field: &'static str, value: String },

    #[error("listener.backlog must be greater than zero")]
    ZeroBacklog,

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("session_log.directory must not be empty")]
    EmptyLogDirectory,

    #[error("session_log.base_name must not be empty")]
    EmptyLogBaseName,

    #[error("session_log.base_name `{base_name}` must not contain path separators")]
    LogBaseNameHasSeparator { base_name: String },
}
