use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::{
    ConfigError, FramingMode, Limits, ListenerConfig, LogFormat, LogLevel, LoggingConfig,
    RfidtapConfig, SessionLogConfig,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub(crate) struct RfidtapConfigDocument {
    #[serde(default = "default_listener_document")]
    pub listener: ListenerConfigDocument,
    #[serde(default = "default_limits_document")]
    pub limits: LimitsDocument,
    #[serde(default = "default_session_log_document")]
    pub session_log: SessionLogConfigDocument,
    #[serde(default = "default_logging_document")]
    pub logging: LoggingConfigDocument,
}

impl From<&RfidtapConfig> for RfidtapConfigDocument {
    fn from(value: &RfidtapConfig) -> Self {
        Self {
            listener: ListenerConfigDocument::from(&value.listener),
            limits: LimitsDocument::from(&value.limits),
            session_log: SessionLogConfigDocument::from(&value.session_log),
            logging: LoggingConfigDocument::from(&value.logging),
        }
    }
}

impl TryFrom<RfidtapConfigDocument> for RfidtapConfig {
    type Error = ConfigError;

    fn try_from(value: RfidtapConfigDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            listener: value.listener.try_into()?,
            limits: value.limits.into(),
            session_log: value.session_log.into(),
            logging: value.logging.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub(crate) struct ListenerConfigDocument {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_backlog")]
    pub backlog: u32,
    #[serde(default = "default_idle_timeout_document")]
    pub idle_timeout: DurationDocument,
    #[serde(default)]
    pub framing: FramingModeDocument,
}

impl From<&ListenerConfig> for ListenerConfigDocument {
    fn from(value: &ListenerConfig) -> Self {
        Self {
            bind: value.bind.to_string(),
            backlog: value.backlog,
            idle_timeout: DurationDocument::from_duration(value.idle_timeout),
            framing: FramingModeDocument::from(value.framing),
        }
    }
}

impl TryFrom<ListenerConfigDocument> for ListenerConfig {
    type Error = ConfigError;

    fn try_from(value: ListenerConfigDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            bind: parse_socket_addr("listener.bind", value.bind)?,
            backlog: value.backlog,
            idle_timeout: value.idle_timeout.into_duration(),
            framing: value.framing.into(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum FramingModeDocument {
    #[default]
    ReadBoundary,
    Reassemble,
}

impl From<FramingMode> for FramingModeDocument {
    fn from(value: FramingMode) -> Self {
        match value {
            FramingMode::ReadBoundary => Self::ReadBoundary,
            FramingMode::Reassemble => Self::Reassemble,
        }
    }
}

impl From<FramingModeDocument> for FramingMode {
    fn from(value: FramingModeDocument) -> Self {
        match value {
            FramingModeDocument::ReadBoundary => Self::ReadBoundary,
            FramingModeDocument::Reassemble => Self::Reassemble,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub(crate) struct LimitsDocument {
    #[serde(default = "default_max_read_bytes")]
    pub max_read_bytes: usize,
    #[serde(default = "default_max_pending_bytes")]
    pub max_pending_bytes: usize,
}

impl From<&Limits> for LimitsDocument {
    fn from(value: &Limits) -> Self {
        Self {
            max_read_bytes: value.max_read_bytes,
            max_pending_bytes: value.max_pending_bytes,
        }
    }
}

impl From<LimitsDocument> for Limits {
    fn from(value: LimitsDocument) -> Self {
        Self {
            max_read_bytes: value.max_read_bytes,
            max_pending_bytes: value.max_pending_bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub(crate) struct SessionLogConfigDocument {
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_base_name")]
    pub base_name: String,
}

impl From<&SessionLogConfig> for SessionLogConfigDocument {
    fn from(value: &SessionLogConfig) -> Self {
        Self {
            directory: value.directory.clone(),
            base_name: value.base_name.clone(),
        }
    }
}

impl From<SessionLogConfigDocument> for SessionLogConfig {
    fn from(value: SessionLogConfigDocument) -> Self {
        Self {
            directory: value.directory,
            base_name: value.base_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub(crate) struct LoggingConfigDocument {
    #[serde(default)]
    pub level: LogLevelDocument,
    #[serde(default)]
    pub format: LogFormatDocument,
}

impl From<&LoggingConfig> for LoggingConfigDocument {
    fn from(value: &LoggingConfig) -> Self {
        Self {
            level: LogLevelDocument::from(value.level),
            format: LogFormatDocument::from(value.format),
        }
    }
}

impl From<LoggingConfigDocument> for LoggingConfig {
    fn from(value: LoggingConfigDocument) -> Self {
        Self {
            level: value.level.into(),
            format: value.format.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum LogLevelDocument {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for LogLevelDocument {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::Trace,
            LogLevel::Debug => Self::Debug,
            LogLevel::Info => Self::Info,
            LogLevel::Warn => Self::Warn,
            LogLevel::Error => Self::Error,
        }
    }
}

impl From<LogLevelDocument> for LogLevel {
    fn from(value: LogLevelDocument) -> Self {
        match value {
            LogLevelDocument::Trace => Self::Trace,
            LogLevelDocument::Debug => Self::Debug,
            LogLevelDocument::Info => Self::Info,
            LogLevelDocument::Warn => Self::Warn,
            LogLevelDocument::Error => Self::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum LogFormatDocument {
    Json,
    #[default]
    Pretty,
    Compact,
}

impl From<LogFormat> for LogFormatDocument {
    fn from(value: LogFormat) -> Self {
        match value {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

impl From<LogFormatDocument> for LogFormat {
    fn from(value: LogFormatDocument) -> Self {
        match value {
            LogFormatDocument::Json => Self::Json,
            LogFormatDocument::Pretty => Self::Pretty,
            LogFormatDocument::Compact => Self::Compact,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[schemars(with = "String")]
pub(crate) struct DurationDocument(Duration);

impl DurationDocument {
    pub(crate) const fn from_duration(value: Duration) -> Self {
        Self(value)
    }

    pub(crate) const fn into_duration(self) -> Duration {
        self.0
    }
}

impl Serialize for DurationDocument {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_duration(self.0))
    }
}

impl<'de> Deserialize<'de> for DurationDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawDuration {
            Text(String),
            Milliseconds(u64),
        }

        let raw = RawDuration::deserialize(deserializer)?;
        match raw {
            RawDuration::Text(text) => parse_duration(&text)
                .map(Self)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid duration: {text}"))),
            RawDuration::Milliseconds(ms) => Ok(Self(Duration::from_millis(ms))),
        }
    }
}

/// JSON schema of the YAML config document.
pub fn json_schema() -> JsonValue {
    serde_json::to_value(schema_for!(RfidtapConfigDocument)).unwrap_or(JsonValue::Null)
}

fn default_listener_document() -> ListenerConfigDocument {
    ListenerConfigDocument::from(&ListenerConfig::default())
}

fn default_limits_document() -> LimitsDocument {
    LimitsDocument::from(&Limits::default())
}

fn default_session_log_document() -> SessionLogConfigDocument {
    SessionLogConfigDocument::from(&SessionLogConfig::default())
}

fn default_logging_document() -> LoggingConfigDocument {
    LoggingConfigDocument::from(&LoggingConfig::default())
}

fn default_bind() -> String {
    ListenerConfig::default().bind.to_string()
}

fn default_backlog() -> u32 {
    ListenerConfig::default().backlog
}

fn default_idle_timeout_document() -> DurationDocument {
    DurationDocument::from_duration(ListenerConfig::default().idle_timeout)
}

fn default_max_read_bytes() -> usize {
    Limits::DEFAULT_MAX_READ_BYTES
}

fn default_max_pending_bytes() -> usize {
    Limits::DEFAULT_MAX_PENDING_BYTES
}

fn default_log_directory() -> PathBuf {
    SessionLogConfig::default().directory
}

fn default_log_base_name() -> String {
    SessionLogConfig::default().base_name
}

fn parse_socket_addr(field: &'static str, value: String) -> Result<SocketAddr, ConfigError> {
    SocketAddr::from_str(&value).map_err(|_| ConfigError::InvalidAddress { field, value })
}

/// Parses `500ms`, `30s`, `2m`, `1h` or a bare number of seconds.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let text = raw.trim();
    if let Some(value) = text.strip_suffix("ms") {
        return value.trim().parse::<u64>().ok().map(Duration::from_millis);
    }
    if let Some(value) = text.strip_suffix('s') {
        return value.trim().parse::<u64>().ok().map(Duration::from_secs);
    }
    if let Some(value) = text.strip_suffix('m') {
        return value
            .trim()
            .parse::<u64>()
            .ok()
            .map(|minutes| Duration::from_secs(minutes.saturating_mul(60)));
    }
    if let Some(value) = text.strip_suffix('h') {
        return value
            .trim()
            .parse::<u64>()
            .ok()
            .map(|hours| Duration::from_secs(hours.saturating_mul(60 * 60)));
    }

    text.parse::<u64>().ok().map(Duration::from_secs)
}

fn format_duration(duration: Duration) -> String {
    if duration.subsec_nanos() == 0 {
        return format!("{}s", duration.as_secs());
    }

    format!("{}ms", duration.as_millis())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{format_duration, json_schema, parse_duration};

    #[test]
    fn parses_duration_suffixes() {
        assert_eq!(parse_duration("250ms"), Some(Duration::from_millis(250)));
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("1h"), Some(Duration::from_secs(3_600)));
        assert_eq!(parse_duration(" 45 "), Some(Duration::from_secs(45)));
        assert_eq!(parse_duration("soon"), None);
    }

    #[test]
    fn formats_whole_seconds_and_milliseconds() {
        assert_eq!(format_duration(Duration::from_secs(120)), "120s");
        assert_eq!(format_duration(Duration::from_millis(1_500)), "1500ms");
    }

    #[test]
    fn schema_describes_top_level_sections() {
        let schema = json_schema();
        let properties = schema
            .get("properties")
            .and_then(|value| value.as_object())
            .expect("schema should list properties");
        for section in ["listener", "limits", "session_log", "logging"] {
            assert!(properties.contains_key(section), "missing {section}");
        }
    }
}
