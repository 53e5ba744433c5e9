use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;

use rfidtap_config::{FramingMode, ListenerConfig, RfidtapConfig};
use rfidtap_net::ChunkReader;
use rfidtap_record::SessionLog;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::{info, warn};

use crate::{FrameObserver, ServerError, Session, SessionEnd, SessionSummary};

/// What one `serve_one` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeReport {
    /// `None` when shutdown arrived before any client connected.
    pub peer: Option<SocketAddr>,
    pub end: SessionEnd,
    pub summary: SessionSummary,
    pub log_path: Option<PathBuf>,
}

#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Binds with address reuse enabled so a restarted listener does not wait out
    /// `TIME_WAIT` on the port.
    pub fn bind(config: &ListenerConfig) -> Result<Self, ServerError> {
        let addr = config.bind;
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(|source| ServerError::Socket { source })?;

        socket
            .set_reuseaddr(true)
            .map_err(|source| ServerError::SocketOption { source })?;
        socket
            .bind(addr)
            .map_err(|source| ServerError::Bind { addr, source })?;
        let inner = socket
            .listen(config.backlog)
            .map_err(|source| ServerError::Listen { addr, source })?;
        let local_addr = inner
            .local_addr()
            .map_err(|source| ServerError::Listen { addr, source })?;

        info!(%local_addr, backlog = config.backlog, "Server listening");
        Ok(Self { inner, local_addr })
    }

    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub async fn accept_one(&self) -> Result<(TcpStream, SocketAddr), ServerError> {
        let (stream, peer) = self
            .inner
            .accept()
            .await
            .map_err(|source| ServerError::Accept { source })?;
        info!(ip = %peer.ip(), port = peer.port(), "Client connected");
        Ok((stream, peer))
    }

    /// Accepts a single client and runs its session to completion.
    ///
    /// The session log is opened only after a client connects and is closed on every
    /// exit path once opened.
    pub async fn serve_one<O, F>(
        &self,
        config: &RfidtapConfig,
        observer: O,
        shutdown: F,
    ) -> Result<ServeReport, ServerError>
    where
        O: FrameObserver,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let (stream, peer) = tokio::select! {
            biased;
            () = shutdown.as_mut() => {
                info!("Program terminated by user.");
                return Ok(ServeReport {
                    peer: None,
                    end: SessionEnd::Interrupted,
                    summary: SessionSummary::default(),
                    log_path: None,
                });
            }
            accepted = self.accept_one() => accepted?,
        };

        let log = SessionLog::create(
            &config.session_log.directory,
            &config.session_log.base_name,
            chrono::Local::now().date_naive(),
        )?;
        let reader = ChunkReader::new(stream, config.limits.max_read_bytes)?
            .with_idle_timeout(config.listener.idle_timeout);

        let mut session = Session::new(reader, log, observer);
        if config.listener.framing == FramingMode::Reassemble {
            session = session.with_reassembly(config.limits.max_pending_bytes);
        }

        let outcome = session.run(shutdown.as_mut()).await;
        let (summary, log) = session.into_parts();
        let closed = log.close();

        let end = outcome?;
        let log_path = closed?;
        if let Some(path) = &log_path {
            info!(
                path = %path.display(),
                chunks = summary.chunks,
                frames = summary.frames,
                "Data saved"
            );
        }
        if summary.malformed > 0 || summary.invalid > 0 {
            warn!(
                malformed = summary.malformed,
                invalid = summary.invalid,
                "session saw bad frames"
            );
        }

        Ok(ServeReport {
            peer: Some(peer),
            end,
            summary,
            log_path,
        })
    }
}

/// Validates `config`, binds, and serves exactly one client.
pub async fn serve_one<O, F>(
    config: &RfidtapConfig,
    observer: O,
    shutdown: F,
) -> Result<ServeReport, ServerError>
where
    O: FrameObserver,
    F: Future<Output = ()>,
{
    config.validate()?;
    let listener = Listener::bind(&config.listener)?;
    listener.serve_one(config, observer, shutdown).await
}
