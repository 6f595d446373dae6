//! Minimal HTTP/1.0 responder.
//!
//! One request per connection: read at most [`MAX_REQUEST_BYTES`], pick a
//! [`Route`], write a `200 OK` response, close. There is no keep-alive and
//! no error status; anything that goes wrong is logged and the connection
//! is dropped without affecting the accept loop.

use std::{io, net::SocketAddr, sync::Arc, time::Duration};

use log::{debug, info, trace, warn};
use radarscope_core::{CoreError, Response, Route, MAX_REQUEST_BYTES};
use rust_embed::RustEmbed;
use socket2::{Domain, Protocol, Socket, Type};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_graceful_shutdown::SubsystemHandle;
use tokio_util::task::TaskTracker;

use crate::calibration::{CalibrationError, Calibrator};
use crate::store::SnapshotReader;

/// Name of the display page inside the embedded assets.
pub const INDEX_DOCUMENT: &str = "index.html";

/// Back-off after a failed accept (e.g. out of file descriptors).
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

const LISTEN_BACKLOG: i32 = 16;

#[derive(RustEmbed, Clone)]
#[folder = "$CARGO_MANIFEST_DIR/web/"]
struct Assets;

#[derive(Error, Debug)]
pub enum WebError {
    #[error("Socket operation failed: {0}")]
    Io(#[from] io::Error),
    #[error("Cannot listen on {address}: {source}")]
    Bind {
        address: SocketAddr,
        source: io::Error,
    },
    #[error("Missing embedded asset '{0}'")]
    MissingAsset(&'static str),
    #[error("Client did not finish within {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Calibration(#[from] CalibrationError),
    #[error("{0}")]
    Core(#[from] CoreError),
}

/// Bind the listening socket.
///
/// Address reuse is enabled so a restarted server does not have to wait for
/// old connections to leave TIME_WAIT. Must be called inside a tokio runtime.
pub fn bind(address: SocketAddr) -> Result<TcpListener, WebError> {
    let to_bind_error = |source| WebError::Bind { address, source };

    let socket = Socket::new(Domain::for_address(address), Type::STREAM, Some(Protocol::TCP))
        .map_err(to_bind_error)?;
    socket.set_reuse_address(true).map_err(to_bind_error)?;
    socket.set_nonblocking(true).map_err(to_bind_error)?;
    socket.bind(&address.into()).map_err(to_bind_error)?;
    socket.listen(LISTEN_BACKLOG).map_err(to_bind_error)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener).map_err(to_bind_error)
}

/// Load the display page from the embedded assets.
pub fn index_document() -> Result<Arc<[u8]>, WebError> {
    let file = Assets::get(INDEX_DOCUMENT).ok_or(WebError::MissingAsset(INDEX_DOCUMENT))?;
    Ok(Arc::from(file.data.as_ref()))
}

#[derive(Clone)]
pub struct Web {
    reader: SnapshotReader,
    calibrator: Calibrator,
    index: Arc<[u8]>,
    client_timeout: Option<Duration>,
}

impl Web {
    pub fn new(
        reader: SnapshotReader,
        calibrator: Calibrator,
        index: Arc<[u8]>,
        client_timeout: Option<Duration>,
    ) -> Self {
        Web {
            reader,
            calibrator,
            index,
            client_timeout,
        }
    }

    /// Build the response for a classified request.
    pub async fn respond(&self, route: Route) -> Result<Response, WebError> {
        match route {
            Route::Data => Ok(Response::json(&self.reader.read())?),
            Route::Calibrate => {
                self.calibrator.calibrate().await?;
                Ok(Response::calibrated())
            }
            Route::Index => Ok(Response::html(self.index.as_ref())),
        }
    }

    /// Serve a single connection and close it, whatever happens.
    pub async fn handle_connection<S>(&self, mut stream: S, peer: SocketAddr)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let result = match self.client_timeout {
            Some(limit) => tokio::time::timeout(limit, self.serve(&mut stream))
                .await
                .unwrap_or_else(|_| Err(WebError::Timeout(limit))),
            None => self.serve(&mut stream).await,
        };
        match result {
            Ok(route) => debug!("Served {} to {}", route, peer),
            Err(e) => warn!("Client {} error: {}", peer, e),
        }
        if let Err(e) = stream.shutdown().await {
            trace!("Closing connection to {} failed: {}", peer, e);
        }
    }

    async fn serve<S>(&self, stream: &mut S) -> Result<Route, WebError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut request = [0u8; MAX_REQUEST_BYTES];
        let len = stream.read(&mut request).await?;
        let route = Route::classify(&request[..len]);
        let response = self.respond(route).await?;
        stream.write_all(&response.to_bytes()).await?;
        stream.flush().await?;
        Ok(route)
    }

    /// Accept connections until shutdown is requested.
    ///
    /// Each connection is served in its own task so a slow client only
    /// holds up itself.
    pub async fn run(self, subsys: SubsystemHandle, listener: TcpListener) -> Result<(), WebError> {
        let connections = TaskTracker::new();
        info!("Web server running on {}", listener.local_addr()?);

        loop {
            tokio::select! {
                _ = subsys.on_shutdown_requested() => {
                    info!("Web server: shutdown requested");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        trace!("Accepted connection from {}", peer);
                        let web = self.clone();
                        connections.spawn(async move {
                            web.handle_connection(stream, peer).await;
                        });
                    }
                    Err(e) => {
                        warn!("Accept failed: {}", e);
                        tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                    }
                }
            }
        }

        connections.close();
        connections.wait().await;
        Ok(())
    }
}
