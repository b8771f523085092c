//! Key pairs and the two key-agreement schemes built on them.

pub mod dh;
pub mod mqv;

use std::fmt;

use num_bigint_dig::BigUint;
use rand::Rng;

use crate::config::{rng_from_seed, KeyGenConfig};
use crate::group::DomainParameters;

pub use dh::{compute_shared_secret, generate_private_key, generate_public_key};
pub use mqv::{compute_mqv_shared_secret, MqvParty, MqvPublicKeys};

/// A private exponent in `[1, q-1]` and its public value `g^x mod p`.
///
/// Used both as an ephemeral (one session) and as a static (long-lived) key pair;
/// the distinction is only in how long the caller keeps it.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    /// The secret exponent `x`, uniform in `[1, q-1]`. Never sent anywhere.
    pub private_key: BigUint,
    /// `g^x mod p`, the value put on the wire.
    pub public_key: BigUint,
}

impl KeyPair {
    /// Generate a key pair, seeded from `config` or from entropy.
    pub fn generate(params: &DomainParameters, config: &KeyGenConfig) -> Self {
        let mut rng = rng_from_seed(config.seed);
        Self::generate_with_rng(params, &mut rng)
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(params: &DomainParameters, rng: &mut R) -> Self {
        let private_key = generate_private_key(&params.q, rng);
        Self::from_private(private_key, params)
    }

    /// Rebuild a key pair from a known private exponent.
    pub fn from_private(private_key: BigUint, params: &DomainParameters) -> Self {
        let public_key = generate_public_key(&params.g, &private_key, &params.p);
        Self {
            private_key,
            public_key,
        }
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key.to_str_radix(16))
            .finish()
    }
}
