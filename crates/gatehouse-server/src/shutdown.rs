//! Connection tracking for the shutdown drain.
//!
//! Every accepted connection holds a [`ConnectionToken`]. After shutdown
//! starts, the server waits for the tokens to drop, bounded by the drain
//! window, and reports how the drain ended as a [`DrainOutcome`].
//!
//! # Example
//!
//! ```rust
//! use gatehouse_server::shutdown::ConnectionTracker;
//!
//! let tracker = ConnectionTracker::new();
//! let token = tracker.acquire();
//! assert_eq!(tracker.active_connections(), 1);
//!
//! drop(token);
//! assert_eq!(tracker.active_connections(), 0);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// How the shutdown drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Every connection finished inside the drain window.
    Clean,
    /// The window elapsed and the remaining connections were aborted.
    Forced {
        /// Number of connections cut.
        aborted: usize,
    },
}

impl DrainOutcome {
    /// Returns `true` if no connection had to be aborted.
    #[must_use]
    pub const fn is_clean(self) -> bool {
        matches!(self, Self::Clean)
    }
}

/// Counts open connections and wakes a waiter when the count reaches zero.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    active: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl ConnectionTracker {
    /// Creates a tracker with no connections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires a token for one connection.
    #[must_use]
    pub fn acquire(&self) -> ConnectionToken {
        self.active.fetch_add(1, Ordering::SeqCst);
        ConnectionToken {
            active: Arc::clone(&self.active),
            notify: Arc::clone(&self.notify),
        }
    }

    /// Returns the number of open connections.
    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Waits until every token has been dropped.
    ///
    /// Completes immediately when nothing is open.
    pub async fn wait_idle(&self) {
        loop {
            // Register before checking so a drop between the check and the
            // await cannot be missed.
            let notified = self.notify.notified();
            if self.active.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Held by a connection task for as long as the connection is open.
#[derive(Debug)]
pub struct ConnectionToken {
    active: Arc<AtomicUsize>,
    notify: Arc<Notify>,
}

impl Drop for ConnectionToken {
    fn drop(&mut self) {
        if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify.notify_waiters();
        }
    }
}
