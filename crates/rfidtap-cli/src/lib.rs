use std::fs::File;
use std::io::{self, BufReader};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rfidtap::RfidtapError;
use rfidtap_config::{parse_duration, FramingMode, LogFormat, LoggingConfig, RfidtapConfig};
use rfidtap_frame::{decode_chunk, decode_token, parse_token_line, FrameBuilder, HexTokenError};
use rfidtap_record::read_records;
use rfidtap_server::{ConsoleObserver, FrameObserver, SessionEnd};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Exit status after a session ended by Ctrl-C, matching the SIGINT number.
pub const EXIT_INTERRUPTED: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "rfidtap",
    version,
    about = "Single-client TCP listener and decoder for RFID reader frames"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Accept one reader connection, log and decode its frames.
    Listen(ListenArgs),
    /// Decode a recorded session log offline.
    Replay(ReplayArgs),
    /// Build one frame and write it to a listener.
    Send(SendArgs),
    /// Load and validate a config file.
    Validate(ValidateArgs),
    /// Print the JSON schema of the config document.
    Schema,
}

#[derive(Debug, Default, Args)]
pub struct ListenArgs {
    #[arg(long, help = "Address to bind (defaults to all interfaces)")]
    pub bind: Option<IpAddr>,
    #[arg(long, help = "TCP port to listen on (defaults to 6000)")]
    pub port: Option<u16>,
    #[arg(long, help = "Directory for session CSV logs")]
    pub log_dir: Option<PathBuf>,
    #[arg(long, help = "End the session after this much silence (for example 30s)")]
    pub idle_timeout: Option<String>,
    #[arg(long, help = "Split frames on their length byte instead of per read")]
    pub reassemble: bool,
    #[arg(long, help = "Optional path to rfidtap YAML config")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    #[arg(long, help = "Session CSV log to decode")]
    pub input: PathBuf,
    #[arg(long, help = "Optional path to rfidtap YAML config")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SendArgs {
    #[arg(long, help = "Listener address (for example 127.0.0.1:6000)")]
    pub addr: SocketAddr,
    #[arg(long = "type", help = "Frame type byte as two hex digits")]
    pub frame_type: String,
    #[arg(long, help = "Header byte as two hex digits (defaults to bb)")]
    pub header: Option<String>,
    #[arg(long, help = "Comma-separated payload bytes (for example ab,cd)")]
    pub payload: Option<String>,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long, help = "Path to rfidtap YAML config")]
    pub config: PathBuf,
}

/// Counts from decoding a recorded log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayTally {
    pub records: usize,
    pub valid: usize,
    pub invalid: usize,
    pub malformed: usize,
}

/// Runs a command and returns the process exit status on success.
pub fn run(cli: Cli) -> Result<u8, CliError> {
    execute_command(cli.command)
}

fn execute_command(command: Command) -> Result<u8, CliError> {
    match command {
        Command::Listen(args) => run_listen(&args),
        Command::Replay(args) => {
            let config = load_optional_config(args.config.as_deref())?;
            init_tracing(&config.logging);
            let tally = replay_log(&args.input, ConsoleObserver)?;
            info!(
                records = tally.records,
                valid = tally.valid,
                invalid = tally.invalid,
                malformed = tally.malformed,
                "replay finished"
            );
            Ok(0)
        }
        Command::Send(args) => {
            init_tracing(&LoggingConfig::default());
            let frame = build_frame(&args)?;
            runtime()?.block_on(send_frame(args.addr, &frame))?;
            Ok(0)
        }
        Command::Validate(args) => {
            RfidtapConfig::load(&args.config).map_err(facade)?;
            println!("{}: ok", args.config.display());
            Ok(0)
        }
        Command::Schema => {
            let schema = serde_json::to_string_pretty(&rfidtap_config::json_schema())
                .map_err(CliError::SchemaSerialize)?;
            println!("{schema}");
            Ok(0)
        }
    }
}

fn run_listen(args: &ListenArgs) -> Result<u8, CliError> {
    let config = listen_config(args)?;
    init_tracing(&config.logging);

    let report = runtime()?
        .block_on(rfidtap_server::serve_one(
            &config,
            ConsoleObserver,
            interrupted(),
        ))
        .map_err(facade)?;

    Ok(exit_status(report.end))
}

/// Completes on Ctrl-C. If the handler cannot be installed the session runs until the
/// peer leaves or goes idle.
async fn interrupted() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[must_use]
pub const fn exit_status(end: SessionEnd) -> u8 {
    match end {
        SessionEnd::PeerClosed | SessionEnd::IdleTimeout => 0,
        SessionEnd::Interrupted => EXIT_INTERRUPTED,
    }
}

/// Config file (or defaults) with command-line overrides applied on top.
pub fn listen_config(args: &ListenArgs) -> Result<RfidtapConfig, CliError> {
    let mut config = load_optional_config(args.config.as_deref())?;

    if let Some(ip) = args.bind {
        config.listener.bind.set_ip(ip);
    }
    if let Some(port) = args.port {
        config.listener.bind.set_port(port);
    }
    if let Some(directory) = &args.log_dir {
        config.session_log.directory.clone_from(directory);
    }
    if let Some(raw) = &args.idle_timeout {
        config.listener.idle_timeout =
            parse_duration(raw).ok_or_else(|| CliError::InvalidDuration { value: raw.clone() })?;
    }
    if args.reassemble {
        config.listener.framing = FramingMode::Reassemble;
    }

    config.validate().map_err(facade)?;
    Ok(config)
}

fn load_optional_config(path: Option<&Path>) -> Result<RfidtapConfig, CliError> {
    match path {
        Some(path) => RfidtapConfig::load(path).map_err(facade),
        None => Ok(RfidtapConfig::default()),
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_directive()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    // a second install (tests, embedding) keeps the first subscriber
    let _ = match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
}

fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|source| CliError::Runtime { source })
}

/// Decodes every record of a session log, reporting each one to `observer`.
pub fn replay_log<O: FrameObserver>(path: &Path, mut observer: O) -> Result<ReplayTally, CliError> {
    let file = File::open(path).map_err(|source| CliError::InputRead {
        path: path.display().to_string(),
        source,
    })?;
    let records = read_records(BufReader::new(file)).map_err(facade)?;

    let mut tally = ReplayTally::default();
    for record in &records {
        tally.records += 1;
        match decode_chunk(record) {
            Ok(report) => {
                if report.is_valid() {
                    tally.valid += 1;
                } else {
                    tally.invalid += 1;
                }
                observer.on_frame(&report);
            }
            Err(error) => {
                tally.malformed += 1;
                observer.on_malformed(record, &error);
            }
        }
    }
    Ok(tally)
}

/// Encodes the frame described by `send` arguments.
pub fn build_frame(args: &SendArgs) -> Result<Vec<u8>, CliError> {
    let type_byte = decode_token(&args.frame_type).map_err(|source| CliError::HexArgument {
        argument: "--type",
        source,
    })?;

    let mut builder = FrameBuilder::new(type_byte);
    if let Some(header) = &args.header {
        let header = decode_token(header).map_err(|source| CliError::HexArgument {
            argument: "--header",
            source,
        })?;
        builder = builder.header(header);
    }
    if let Some(payload) = &args.payload {
        let payload = parse_token_line(payload).map_err(|source| CliError::HexArgument {
            argument: "--payload",
            source,
        })?;
        builder = builder.payload(payload);
    }

    let frame = builder.build().map_err(facade)?;
    Ok(frame.encode())
}

async fn send_frame(addr: SocketAddr, frame: &[u8]) -> Result<(), CliError> {
    let mut stream = TcpStream::connect(addr)
        .await
        .map_err(|source| CliError::Connect { addr, source })?;
    stream
        .write_all(frame)
        .await
        .map_err(|source| CliError::Send { addr, source })?;
    stream
        .shutdown()
        .await
        .map_err(|source| CliError::Send { addr, source })?;

    info!(%addr, bytes = frame.len(), "frame sent");
    Ok(())
}

fn facade(error: impl Into<RfidtapError>) -> CliError {
    CliError::Facade(error.into())
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Facade(#[from] RfidtapError),

    #[error("`{value}` is not a duration (use 500ms, 30s, 2m or 1h)")]
    InvalidDuration { value: String },

    #[error("{argument}: {source}")]
    HexArgument {
        argument: &'static str,
        source: HexTokenError,
    },

    #[error("failed to read input file `{path}`: {source}")]
    InputRead { path: String, source: io::Error },

    #[error("failed to start the async runtime: {source}")]
    Runtime { source: io::Error },

    #[error("failed to connect to {addr}: {source}")]
    Connect { addr: SocketAddr, source: io::Error },

    #[error("failed to send frame to {addr}: {source}")]
    Send { addr: SocketAddr, source: io::Error },

    #[error("failed to serialize config schema: {0}")]
    SchemaSerialize(#[source] serde_json::Error),
}

impl CliError {
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        1
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::time::Duration;

    use clap::Parser;
    use rfidtap_config::FramingMode;
    use rfidtap_frame::HexTokenError;
    use rfidtap_server::SessionEnd;

    use super::{
        build_frame, exit_status, listen_config, Cli, CliError, Command, ListenArgs, SendArgs,
        EXIT_INTERRUPTED,
    };

    fn send_args(frame_type: &str, header: Option<&str>, payload: Option<&str>) -> SendArgs {
        SendArgs {
            addr: SocketAddr::from(([127, 0, 0, 1], 6000)),
            frame_type: frame_type.to_owned(),
            header: header.map(str::to_owned),
            payload: payload.map(str::to_owned),
        }
    }

    #[test]
    fn required_entrypoint_commands_parse() {
        assert!(Cli::try_parse_from(["rfidtap", "listen"]).is_ok());
        assert!(Cli::try_parse_from([
            "rfidtap",
            "listen",
            "--port",
            "7000",
            "--idle-timeout",
            "30s",
            "--reassemble"
        ])
        .is_ok());
        assert!(Cli::try_parse_from(["rfidtap", "replay", "--input", "log.csv"]).is_ok());
        assert!(Cli::try_parse_from([
            "rfidtap",
            "send",
            "--addr",
            "127.0.0.1:6000",
            "--type",
            "17",
            "--payload",
            "ab,cd"
        ])
        .is_ok());
        assert!(Cli::try_parse_from(["rfidtap", "schema"]).is_ok());
    }

    #[test]
    fn validate_requires_config_path() {
        assert!(Cli::try_parse_from(["rfidtap", "validate"]).is_err());
        let cli = Cli::try_parse_from(["rfidtap", "validate", "--config", "rfidtap.yaml"])
            .expect("config path given");
        assert!(matches!(cli.command, Command::Validate(args) if args.config == PathBuf::from("rfidtap.yaml")));
    }

    #[test]
    fn send_builds_tag_read_frame_with_default_header() {
        let frame = build_frame(&send_args("17", None, Some("ab,cd"))).expect("valid arguments");
        assert_eq!(frame, vec![0xBB, 0x17, 0x02, 0xAB, 0xCD, 0x91]);

        let frame = build_frame(&send_args("40", Some("02"), None)).expect("valid arguments");
        assert_eq!(frame, vec![0x02, 0x40, 0x00, 0x40]);
    }

    #[test]
    fn send_rejects_bad_hex_arguments() {
        let error = build_frame(&send_args("x7", None, None)).expect_err("not hex");
        assert!(matches!(
            error,
            CliError::HexArgument {
                argument: "--type",
                source: HexTokenError::NotHex { .. },
            }
        ));

        let error = build_frame(&send_args("17", None, Some("ab,c"))).expect_err("short token");
        assert!(matches!(
            error,
            CliError::HexArgument {
                argument: "--payload",
                ..
            }
        ));
    }

    #[test]
    fn listen_flags_override_defaults() {
        let config = listen_config(&ListenArgs {
            bind: Some("127.0.0.1".parse().expect("ip literal")),
            port: Some(7001),
            log_dir: Some(PathBuf::from("captures")),
            idle_timeout: Some("45s".to_owned()),
            reassemble: true,
            config: None,
        })
        .expect("overrides are valid");

        assert_eq!(config.listener.bind, SocketAddr::from(([127, 0, 0, 1], 7001)));
        assert_eq!(config.listener.idle_timeout, Duration::from_secs(45));
        assert_eq!(config.listener.framing, FramingMode::Reassemble);
        assert_eq!(config.session_log.directory, PathBuf::from("captures"));
    }

    #[test]
    fn listen_rejects_unparseable_idle_timeout() {
        let error = listen_config(&ListenArgs {
            idle_timeout: Some("soon".to_owned()),
            ..ListenArgs::default()
        })
        .expect_err("not a duration");
        assert!(matches!(error, CliError::InvalidDuration { .. }));

        let error = listen_config(&ListenArgs {
            idle_timeout: Some("0s".to_owned()),
            ..ListenArgs::default()
        })
        .expect_err("zero idle timeout");
        assert!(matches!(error, CliError::Facade(_)));
    }

    #[test]
    fn interrupt_maps_to_sigint_exit_status() {
        assert_eq!(exit_status(SessionEnd::PeerClosed), 0);
        assert_eq!(exit_status(SessionEnd::IdleTimeout), 0);
        assert_eq!(exit_status(SessionEnd::Interrupted), EXIT_INTERRUPTED);
    }
}
