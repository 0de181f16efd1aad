//! HTTP server.
//!
//! The server owns the listener and the connection tasks; every request is
//! handed to the [`Pipeline`]. Liveness probes are answered here and only
//! recorded by it.
//!
//! # Shutdown
//!
//! Once the shutdown signal fires the accept loop stops, each connection is
//! told to finish its in-flight request and close, and the server waits for
//! all connections to go away. Connections still open when the drain window
//! elapses are aborted.

use std::convert::Infallible;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use gatehouse_core::{ApiError, Request, Response, ShutdownSignal};
use gatehouse_middleware::Pipeline;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::health;
use crate::shutdown::{ConnectionTracker, DrainOutcome};

/// Pause after a failed `accept`, so descriptor exhaustion does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// The Gatehouse HTTP server.
///
/// # Example
///
/// ```rust,ignore
/// use gatehouse_server::{Server, ServerConfig};
///
/// let server = Server::new(ServerConfig::default(), pipeline);
/// let outcome = server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    pipeline: Arc<Pipeline>,
}

impl Server {
    /// Creates a server for `pipeline`.
    #[must_use]
    pub fn new(config: ServerConfig, pipeline: Pipeline) -> Self {
        Self {
            config,
            pipeline: Arc::new(pipeline),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the pipeline requests are handed to.
    #[must_use]
    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// Runs until SIGTERM or SIGINT, then drains.
    ///
    /// The OS signals trigger the pipeline's own shutdown signal, so the
    /// shutdown gate and the accept loop switch over together.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run(self) -> Result<DrainOutcome, ServerError> {
        let shutdown = self.pipeline.shutdown_signal().clone();
        shutdown.trigger_on_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Binds the configured address and serves until `shutdown` fires.
    ///
    /// `shutdown` should be the signal the pipeline was built with;
    /// otherwise requests on open connections are not answered with 503
    /// while draining.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run_with_shutdown(
        self,
        shutdown: ShutdownSignal,
    ) -> Result<DrainOutcome, ServerError> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|source| ServerError::InvalidAddress {
                addr: self.config.http_addr().to_string(),
                source,
            })?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's local address cannot be read.
    pub async fn serve(
        self,
        listener: TcpListener,
        shutdown: ShutdownSignal,
    ) -> Result<DrainOutcome, ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "Server listening");

        let tracker = ConnectionTracker::new();
        let mut connections = JoinSet::new();

        let stop = shutdown.recv();
        tokio::pin!(stop);

        loop {
            tokio::select! {
                biased;

                () = &mut stop => {
                    tracing::info!("Shutdown signal received, no longer accepting connections");
                    break;
                }

                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let token = tracker.acquire();
                        let pipeline = Arc::clone(&self.pipeline);
                        let shutdown = shutdown.clone();
                        let max_body_bytes = self.config.max_body_bytes();

                        connections.spawn(async move {
                            let _token = token;
                            if let Err(e) =
                                serve_connection(stream, pipeline, max_body_bytes, shutdown).await
                            {
                                tracing::debug!(%remote_addr, error = %e, "Connection error");
                            }
                        });
                    }
                    Err(e) => pause_after_accept_error(&e).await,
                },

                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "Connection task failed");
                    }
                }
            }
        }

        drop(listener);

        let outcome = drain(&tracker, &mut connections, &self.config).await;
        tracing::info!(?outcome, "Server stopped");
        Ok(outcome)
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

async fn pause_after_accept_error(error: &io::Error) {
    tracing::error!(%error, "Failed to accept connection");
    tokio::time::sleep(ACCEPT_BACKOFF).await;
}

async fn drain(
    tracker: &ConnectionTracker,
    connections: &mut JoinSet<()>,
    config: &ServerConfig,
) -> DrainOutcome {
    let window = config.shutdown_timeout();
    tracing::info!(
        active = tracker.active_connections(),
        window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
        "Draining connections"
    );

    match tokio::time::timeout(window, tracker.wait_idle()).await {
        Ok(()) => {
            while connections.join_next().await.is_some() {}
            DrainOutcome::Clean
        }
        Err(_) => {
            let aborted = tracker.active_connections();
            tracing::warn!(aborted, "Drain window elapsed, aborting open connections");
            connections.abort_all();
            while connections.join_next().await.is_some() {}
            DrainOutcome::Forced { aborted }
        }
    }
}

async fn serve_connection(
    stream: TcpStream,
    pipeline: Arc<Pipeline>,
    max_body_bytes: usize,
    shutdown: ShutdownSignal,
) -> Result<(), hyper::Error> {
    let io = TokioIo::new(stream);
    let service = service_fn(move |request: http::Request<Incoming>| {
        let pipeline = Arc::clone(&pipeline);
        async move { Ok::<_, Infallible>(handle_request(&pipeline, request, max_body_bytes).await) }
    });

    let conn = http1::Builder::new().serve_connection(io, service);
    tokio::pin!(conn);

    let stop = shutdown.recv();
    tokio::pin!(stop);
    let mut closing = false;

    loop {
        tokio::select! {
            result = conn.as_mut() => return result,
            () = &mut stop, if !closing => {
                closing = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    }
}

async fn handle_request(
    pipeline: &Pipeline,
    request: http::Request<Incoming>,
    max_body_bytes: usize,
) -> Response {
    let (parts, body) = request.into_parts();
    if health::is_health_check(&parts.method, parts.uri.path()) {
        let response = health::health_response(pipeline.shutdown_signal().is_shutdown());
        return pipeline
            .answer(Request::from_parts(parts, Bytes::new()), response)
            .await;
    }

    match Limited::new(body, max_body_bytes).collect().await {
        Ok(collected) => {
            pipeline
                .process(Request::from_parts(parts, collected.to_bytes()))
                .await
        }
        Err(e) => {
            let message = if e.downcast_ref::<LengthLimitError>().is_some() {
                "request body too large"
            } else {
                "invalid request body"
            };
            tracing::debug!(error = %e, "Failed to read request body");
            pipeline
                .reject(
                    Request::from_parts(parts, Bytes::new()),
                    ApiError::bad_request(message),
                )
                .await
        }
    }
}
