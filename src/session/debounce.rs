//! Generation-counter cancellation for debounced work

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::task::JoinError;

/// Quiet period before a live macro preview runs
pub const PREVIEW_DEBOUNCE: Duration = Duration::from_millis(300);
/// Quiet period before a full compute runs
pub const COMPUTE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Shared request counter. Issuing a ticket supersedes every earlier one.
#[derive(Debug, Clone, Default)]
pub struct Generation(Arc<AtomicU64>);

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        let id = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            id,
            generation: Arc::clone(&self.0),
        }
    }

    /// Id of the newest ticket
    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct Ticket {
    id: u64,
    generation: Arc<AtomicU64>,
}

impl Ticket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// True while no newer ticket has been issued
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.id
    }
}

/// Runs only the latest of a burst of requests. Clones share one counter.
#[derive(Debug, Clone)]
pub struct Debouncer {
    generation: Generation,
    delay: Duration,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            generation: Generation::new(),
            delay,
        }
    }

    pub fn preview() -> Self {
        Self::new(PREVIEW_DEBOUNCE)
    }

    pub fn compute() -> Self {
        Self::new(COMPUTE_DEBOUNCE)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn generation(&self) -> &Generation {
        &self.generation
    }

    /// Supersede anything pending without scheduling new work
    pub fn cancel(&self) {
        self.generation.issue();
    }

    /// Issue a ticket now and return the deferred work.
    ///
    /// The future sleeps the debounce window, runs `job` on a blocking
    /// thread, and yields `None` if a newer request arrived before or during
    /// the run. A job that panicked or was aborted yields `Some(Err(_))`.
    pub fn schedule<T, F>(&self, job: F) -> impl Future<Output = Option<Result<T, JoinError>>> + Send + 'static
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let ticket = self.generation.issue();
        let delay = self.delay;
        async move {
            tokio::time::sleep(delay).await;
            if !ticket.is_current() {
                debug!("Request {} superseded before running", ticket.id());
                return None;
            }
            match tokio::task::spawn_blocking(job).await {
                Ok(value) if ticket.is_current() => Some(Ok(value)),
                Ok(_) => {
                    debug!("Request {} superseded while running, result discarded", ticket.id());
                    None
                }
                Err(e) => {
                    warn!("Request {} failed to complete: {}", ticket.id(), e);
                    Some(Err(e))
                }
            }
        }
    }

    pub async fn run<T, F>(&self, job: F) -> Option<Result<T, JoinError>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        self.schedule(job).await
    }
}
