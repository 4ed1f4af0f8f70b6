//! Production Environment implementation using OS randomness.

use std::time::Duration;

use santa_core::Environment;

/// Production environment using `getrandom` for draws and tokio for pacing.
///
/// Draws come from the operating system, so no two runs repeat. Use
/// [`santa_core::SeededEnv`] for a reproducible draw.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        if let Err(err) = getrandom::fill(buffer) {
            // Only reachable on unsupported platforms. Zeros still produce a
            // valid (if predictable) draw.
            tracing::error!(%err, "getrandom failed");
            buffer.fill(0);
        }
    }
}
