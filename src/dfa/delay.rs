//! Gate-close timing.
//!
//! The engine waits between `CarEnters` and `Timer` while the physical gate
//! swings shut. The wait is a capability handed to the engine so tests can run
//! without elapsed time.

use std::time::Duration;

use tokio::time::sleep;

/// Suspends the current entry workflow for the gate-close delay.
///
/// Implementations must not be cancelled part-way; the engine is borrowed
/// mutably for the whole wait so no other transition can interleave.
pub trait GateDelay {
    async fn wait(&self, duration: Duration);
}

/// Real delay backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDelay;

impl GateDelay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        sleep(duration).await;
    }
}

/// Returns immediately regardless of the configured duration.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelay;

impl GateDelay for NoDelay {
    async fn wait(&self, _duration: Duration) {}
}
