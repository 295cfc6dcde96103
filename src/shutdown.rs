//! Cooperative shutdown on termination signals.
//!
//! The signal handler only sets a flag. The sampler reads it at loop
//! boundaries and during its interval wait; an in-flight pass is never
//! interrupted.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

/// Read-only view of the shutdown request.
#[derive(Debug, Clone)]
pub struct ShutdownFlag {
    requested: Arc<AtomicBool>,
}

impl ShutdownFlag {
    pub fn is_set(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Owns the shutdown flag and the signal registration.
#[derive(Debug, Clone, Default)]
pub struct ShutdownCoordinator {
    requested: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for components that only observe the flag.
    pub fn flag(&self) -> ShutdownFlag {
        ShutdownFlag {
            requested: Arc::clone(&self.requested),
        }
    }

    /// Requests shutdown. Idempotent.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Registers for SIGINT, SIGTERM and SIGHUP.
    ///
    /// Can succeed only once per process.
    pub fn install(&self) -> Result<(), ctrlc::Error> {
        let coordinator = self.clone();
        ctrlc::set_handler(move || {
            if !coordinator.is_requested() {
                info!("Received shutdown signal");
            }
            coordinator.request();
        })
    }
}
