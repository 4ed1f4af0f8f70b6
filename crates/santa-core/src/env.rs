//! Environment abstraction for deterministic draws.
//!
//! The `Environment` trait decouples the assignment engine from its source of
//! randomness (and the driver from wall-clock pacing). This enables:
//!
//! - Deterministic Testing: `SeededEnv` replays the exact same draws for the
//!   same seed, so any surprising assignment can be reproduced.
//!
//! - Production Runtime: drivers plug in OS entropy without any change to the
//!   engine or sequencer.
//!
//! # Invariants
//!
//! - Determinism: Given the same seed, `random_bytes()` produces the same
//!   sequence
//! - Uniformity: draws go through `EnvRng`, so `rand`'s unbiased range and
//!   shuffle sampling applies to every implementation
//! - Isolation: Implementations must not share global state

use std::{
    fmt,
    future::Future,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Abstract environment providing randomness and async pacing.
///
/// Engine logic only ever calls the random methods. `sleep` exists for hosts
/// that want cosmetic pacing before showing results; it carries no timing
/// contract for the core.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Sleeps for the specified duration.
    ///
    /// This is the ONLY async method in the trait, and it should only be used
    /// by driver code (not engine logic).
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Determinism in tests: Given the same seed, this produces the same
    ///   sequence of bytes
    /// - Unpredictability in production: backed by OS entropy
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Generates a random `u64`.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }

    /// A `rand` generator that draws from this environment.
    fn rng(&self) -> EnvRng<'_, Self> {
        EnvRng::new(self)
    }
}

/// Adapts an [`Environment`] into a [`rand::RngCore`].
///
/// Range and shuffle sampling (`Rng::gen_range`, `SliceRandom`) then come from
/// `rand`, while every byte still flows through `random_bytes`.
#[derive(Debug)]
pub struct EnvRng<'a, E>(&'a E);

impl<'a, E: Environment> EnvRng<'a, E> {
    /// Borrow `env` as a random number generator.
    pub fn new(env: &'a E) -> Self {
        Self(env)
    }
}

impl<E: Environment> RngCore for EnvRng<'_, E> {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.0.random_bytes(&mut bytes);
        u32::from_be_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        self.0.random_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.random_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Deterministic environment backed by a seeded ChaCha stream.
///
/// Clones share one stream, so a session and the engine it drives draw from
/// the same sequence. `sleep` completes immediately.
#[derive(Clone)]
pub struct SeededEnv {
    seed: u64,
    rng: Arc<Mutex<ChaCha8Rng>>,
}

impl SeededEnv {
    /// Create an environment whose draws are fully determined by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed, rng: Arc::new(Mutex::new(ChaCha8Rng::seed_from_u64(seed))) }
    }

    /// The seed this environment was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl fmt::Debug for SeededEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededEnv").field("seed", &self.seed).finish_non_exhaustive()
    }
}

impl Environment for SeededEnv {
    fn sleep(&self, _duration: Duration) -> impl Future<Output = ()> + Send {
        std::future::ready(())
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        // A poisoned lock still holds a valid RNG state.
        self.rng.lock().unwrap_or_else(PoisonError::into_inner).fill_bytes(buffer);
    }
}
