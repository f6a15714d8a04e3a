//! Ctrl-C handling.
//!
//! The handler only raises a flag. The workflow polls it between steps so
//! an interrupt still goes through workspace restoration.

use crate::error::{BenchDiffError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// Shared interrupt flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a token raised by Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns an error if a handler is already installed for this process.
    pub fn install() -> Result<Self> {
        let token = Self::new();
        let flag = Arc::clone(&token.flag);
        ctrlc::set_handler(move || {
            if !flag.swap(true, Ordering::SeqCst) {
                eprintln!("\nInterrupted; restoring the working tree before exit...");
            }
        })
        .map_err(|e| anyhow::anyhow!("failed to install Ctrl-C handler: {e}"))?;
        Ok(token)
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Fail with `Cancelled` if the flag is raised.
    ///
    /// # Errors
    ///
    /// Returns `BenchDiffError::Cancelled` once the token has been raised.
    pub fn check(&self, step: &str) -> Result<()> {
        if self.is_cancelled() {
            warn!(step, "Cancelled before step");
            return Err(BenchDiffError::Cancelled);
        }
        Ok(())
    }
}
