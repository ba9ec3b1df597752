use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{ReliefError, ReliefResult};

/// Shared cooperative cancellation flag.
///
/// The dispatcher checks it before pulling each frame and workers check it before rendering each
/// work item. It is never polled inside per-pixel loops, so cancellation takes effect at the next
/// item boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Route Ctrl-C (SIGINT) to this token instead of terminating the process.
    ///
    /// Only one handler can be installed per process.
    pub fn install_interrupt_handler(&self) -> ReliefResult<()> {
        let token = self.clone();
        ctrlc::set_handler(move || {
            if !token.is_cancelled() {
                tracing::warn!("interrupt received, finishing in-flight frames");
            }
            token.cancel();
        })
        .map_err(|e| {
            ReliefError::Other(anyhow::anyhow!("failed to install interrupt handler: {e}"))
        })
    }
}
