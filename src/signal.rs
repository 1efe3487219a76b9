//! Cooperative cancellation.
//!
//! A [`CancelToken`] is flipped by the Ctrl-C listener and polled by the
//! pipeline between download chunks and at phase boundaries. Nothing is
//! aborted preemptively.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Result, TraknabError};

/// Shared flag signalling that the user asked the run to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns `Err(INTERRUPTED)` once the token has been cancelled.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(TraknabError::cancelled())
        } else {
            Ok(())
        }
    }
}

/// Spawns a listener thread that cancels `token` on Ctrl-C.
///
/// The listener owns a current-thread tokio runtime so the rest of the
/// program stays synchronous.
pub fn install_interrupt_handler(token: CancelToken) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| TraknabError::io("Failed to build signal runtime", e))?;

    std::thread::Builder::new()
        .name("traknab-signal".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        warn!("Received Ctrl+C, stopping after cleanup");
                        token.cancel();
                    }
                    Err(e) => debug!(error = %e, "Ctrl+C handler unavailable"),
                }
            });
        })
        .map_err(|e| TraknabError::io("Failed to spawn signal thread", e))?;

    Ok(())
}
