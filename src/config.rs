//! Configuration structs for parameter generation, key generation and sessions.
//!
//! Every struct that drives randomness carries an optional `seed`. With a seed the
//! run is reproducible (tests, benchmarks); without one the RNG is drawn from OS
//! entropy.

use std::time::Duration;

use rand::{rngs::StdRng, SeedableRng};

use crate::group::GroupKind;

/// Default Miller-Rabin round count for primality checks.
pub const DEFAULT_PRIMALITY_ROUNDS: usize = 25;

/// Default TCP port used by both roles.
pub const DEFAULT_PORT: u16 = 12345;

/// Configuration to generate domain parameters.
#[derive(Debug, Clone)]
pub struct GroupConfig {
    /// Bit length of the subgroup order `q`. `p = 2q + 1` is one bit longer.
    pub q_bits: usize,
    /// Which group the generator `g` should span.
    pub kind: GroupKind,
    /// Miller-Rabin rounds used when testing `q` and `p`.
    pub primality_rounds: usize,
    /// Give up after this many `(q, p)` candidates. `None` searches until success.
    pub max_attempts: Option<usize>,
    /// Optional RNG seed for reproducible parameters.
    pub seed: Option<u64>,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            q_bits: 256,
            kind: GroupKind::Subgroup,
            primality_rounds: DEFAULT_PRIMALITY_ROUNDS,
            max_attempts: None,
            seed: None,
        }
    }
}

/// Configuration for key pair generation given a set of domain parameters.
#[derive(Debug, Clone, Default)]
pub struct KeyGenConfig {
    /// Optional RNG seed for reproducible keys.
    pub seed: Option<u64>,
}

/// Configuration for one networked session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Port the listener binds and the initiator connects to.
    pub port: u16,
    /// Read/write timeout on the socket. `None` blocks indefinitely.
    pub io_timeout: Option<Duration>,
    /// Largest binary payload accepted from the peer, in bytes.
    pub max_payload: u64,
    /// Longest hex line accepted for a single wire value.
    pub max_value_len: usize,
    /// Miller-Rabin rounds used by [`Session::new`](crate::session::Session::new) to
    /// validate the domain parameters.
    pub primality_rounds: usize,
    /// Seed for the session's key generation.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            io_timeout: None,
            max_payload: 1 << 30,
            max_value_len: 64 * 1024,
            primality_rounds: DEFAULT_PRIMALITY_ROUNDS,
            seed: None,
        }
    }
}

/// Build the RNG for a run: seeded when asked, entropy otherwise.
pub(crate) fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}
