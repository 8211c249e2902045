//! Graceful shutdown coordination.
//!
//! A [`ShutdownSignal`] is a cloneable handle that can be triggered once
//! and awaited from many tasks; a [`ConnectionTracker`] counts in-flight
//! connections so shutdown can drain them before the process exits.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::sync::broadcast;
use tokio::sync::Notify;

/// A signal used to trigger and await graceful shutdown.
///
/// All clones observe the same trigger. Triggering is idempotent.
///
/// # Example
///
/// ```rust
/// use gantry_server::ShutdownSignal;
///
/// let shutdown = ShutdownSignal::new();
/// assert!(!shutdown.is_shutdown());
///
/// shutdown.trigger();
/// assert!(shutdown.is_shutdown());
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    triggered: Arc<AtomicBool>,
    sender: broadcast::Sender<()>,
}

impl ShutdownSignal {
    /// Creates a new, untriggered signal.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            triggered: Arc::new(AtomicBool::new(false)),
            sender,
        }
    }

    /// Triggers the signal, waking every waiter. Idempotent.
    pub fn trigger(&self) {
        if self
            .triggered
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            // No receivers is fine.
            let _ = self.sender.send(());
        }
    }

    /// Returns `true` once the signal has been triggered.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Returns a future completing when the signal triggers.
    ///
    /// Completes immediately when already triggered.
    pub fn recv(&self) -> ShutdownReceiver {
        let gate = Arc::clone(&self.triggered);
        let mut receiver = self.sender.subscribe();
        ShutdownReceiver {
            triggered: Arc::clone(&self.triggered),
            waiter: Box::pin(async move {
                if gate.load(Ordering::SeqCst) {
                    return;
                }
                let _ = receiver.recv().await;
            }),
        }
    }

    /// Creates a signal wired to SIGTERM and SIGINT.
    ///
    /// # Panics
    ///
    /// Panics when the OS signal handlers cannot be registered.
    #[must_use]
    pub fn with_os_signals() -> Self {
        let signal = Self::new();
        let signal_clone = signal.clone();

        tokio::spawn(async move {
            wait_for_os_signal().await;
            signal_clone.trigger();
        });

        signal
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// A future completing when the shutdown signal triggers.
///
/// Created by [`ShutdownSignal::recv`].
pub struct ShutdownReceiver {
    triggered: Arc<AtomicBool>,
    waiter: Pin<Box<dyn Future<Output = ()> + Send>>,
}

impl Future for ShutdownReceiver {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.triggered.load(Ordering::SeqCst) {
            return Poll::Ready(());
        }

        self.waiter.as_mut().poll(cx)
    }
}

/// Waits for SIGTERM or SIGINT (Ctrl+C on non-Unix platforms).
async fn wait_for_os_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
        let mut sigint =
            signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                tracing::info!("Received SIGTERM, initiating graceful shutdown");
            }
            _ = sigint.recv() => {
                tracing::info!("Received SIGINT, initiating graceful shutdown");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to wait for Ctrl+C");
        tracing::info!("Received Ctrl+C, initiating graceful shutdown");
    }
}

/// Counts in-flight connections so shutdown can drain them.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    active: Arc<AtomicUsize>,
    drained: Arc<Notify>,
}

impl ConnectionTracker {
    /// Creates a tracker with no active connections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection; dropping the token deregisters it.
    #[must_use]
    pub fn acquire(&self) -> ConnectionToken {
        self.active.fetch_add(1, Ordering::SeqCst);
        ConnectionToken {
            active: Arc::clone(&self.active),
            drained: Arc::clone(&self.drained),
        }
    }

    /// Returns the number of active connections.
    #[must_use]
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Waits until every tracked connection has closed.
    pub async fn wait_for_drain(&self) {
        loop {
            let drained = self.drained.notified();
            if self.active.load(Ordering::SeqCst) == 0 {
                return;
            }
            drained.await;
        }
    }
}

/// A token representing one tracked connection.
#[derive(Debug)]
pub struct ConnectionToken {
    active: Arc<AtomicUsize>,
    drained: Arc<Notify>,
}

impl Drop for ConnectionToken {
    fn drop(&mut self) {
        if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.drained.notify_waiters();
        }
    }
}
