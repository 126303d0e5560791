//! Cooperative cancellation for long sol-range queries.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rovertrace_types::AnalyticsError;

/// A shared flag that asks an in-flight query to stop.
///
/// Clones share the flag.  The engine checks it between sol batches, so a
/// cancelled query stops after at most one more batch.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once [`cancel`][Self::cancel] has been called.
    pub fn check(&self, completed_sols: u32) -> Result<(), AnalyticsError> {
        if self.is_cancelled() {
            return Err(AnalyticsError::Cancelled { completed_sols });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_passes() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.check(0).is_ok());
    }

    #[test]
    fn clones_share_the_flag() {
        let token = CancellationToken::new();
        let handle = token.clone();
        handle.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(
            token.check(4),
            Err(AnalyticsError::Cancelled { completed_sols: 4 })
        ));
    }

    #[test]
    fn cancel_from_another_thread() {
        let token = CancellationToken::new();
        let handle = token.clone();
        std::thread::spawn(move || handle.cancel()).join().unwrap();
        assert!(token.is_cancelled());
    }
}
