//! Process-wide shutdown signal.
//!
//! A single [`ShutdownSignal`] is shared by the OS-signal listener, the
//! shutdown gate in the pipeline and the server's accept loop. It flips from
//! running to draining exactly once and never flips back.
//!
//! # Example
//!
//! ```rust,ignore
//! use gatehouse_core::ShutdownSignal;
//! use std::time::Duration;
//!
//! let shutdown = ShutdownSignal::new();
//! tokio::select! {
//!     _ = shutdown.recv() => println!("Shutdown signal received"),
//!     _ = tokio::time::sleep(Duration::from_secs(60)) => println!("Timeout"),
//! }
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;

/// A signal that can be used to trigger and await graceful shutdown.
///
/// Clones share the same flag.
///
/// # Example
///
/// ```rust
/// use gatehouse_core::ShutdownSignal;
///
/// let shutdown = ShutdownSignal::new();
/// let gate_view = shutdown.clone();
///
/// shutdown.trigger();
/// assert!(gate_view.is_shutdown());
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    triggered: Arc<AtomicBool>,
    sender: broadcast::Sender<()>,
}

impl ShutdownSignal {
    /// Creates a new, untriggered shutdown signal.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            triggered: Arc::new(AtomicBool::new(false)),
            sender,
        }
    }

    /// Triggers the shutdown signal.
    ///
    /// Returns `true` for the call that performed the transition and `false`
    /// for every later call.
    pub fn trigger(&self) -> bool {
        let first = self
            .triggered
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if first {
            // No receivers is fine.
            let _ = self.sender.send(());
        }
        first
    }

    /// Returns `true` if shutdown has been triggered.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Returns a future that completes when shutdown is triggered.
    ///
    /// The future subscribes when `recv` is called, so a trigger that lands
    /// before it is first polled is not missed. If shutdown has already been
    /// triggered, the future completes immediately.
    pub fn recv(&self) -> impl Future<Output = ()> + Send + 'static {
        let triggered = Arc::clone(&self.triggered);
        let mut receiver = self.sender.subscribe();
        async move {
            if triggered.load(Ordering::SeqCst) {
                return;
            }
            // Closed means every sender is gone; nothing can trigger any more.
            let _ = receiver.recv().await;
        }
    }

    /// Creates a shutdown signal triggered by SIGTERM or SIGINT.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn with_os_signals() -> Self {
        let signal = Self::new();
        signal.trigger_on_os_signals();
        signal
    }

    /// Spawns a task that triggers this signal on SIGTERM or SIGINT.
    ///
    /// Must be called from within a tokio runtime. If the OS handlers cannot
    /// be registered the failure is logged and the signal can still be
    /// triggered programmatically.
    pub fn trigger_on_os_signals(&self) {
        let signal = self.clone();

        tokio::spawn(async move {
            match wait_for_os_signal().await {
                Ok(name) => {
                    tracing::info!(signal = name, "Received shutdown signal, draining");
                    signal.trigger();
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to register OS signal handlers");
                }
            }
        });
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn wait_for_os_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => Ok("SIGTERM"),
        _ = sigint.recv() => Ok("SIGINT"),
    }
}

#[cfg(not(unix))]
async fn wait_for_os_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}
