//! Classical Diffie-Hellman over the domain parameters.
//!
//! Each party picks `x` in `[1, q-1]`, publishes `g^x mod p`, and raises the peer's
//! public value to its own `x`. Both sides land on `g^(x_a * x_b) mod p`.

use num_bigint_dig::{BigUint, RandBigInt};
use num_traits::One;
use rand::Rng;

use super::KeyPair;
use crate::group::DomainParameters;

/// Uniformly random private exponent in `[1, q-1]`.
pub fn generate_private_key<R: Rng + ?Sized>(q: &BigUint, rng: &mut R) -> BigUint {
    rng.gen_biguint_range(&BigUint::one(), q)
}

/// `g^x mod p`.
pub fn generate_public_key(g: &BigUint, private_key: &BigUint, p: &BigUint) -> BigUint {
    g.modpow(private_key, p)
}

/// `peer_public^own_private mod p`.
pub fn compute_shared_secret(
    peer_public: &BigUint,
    own_private: &BigUint,
    p: &BigUint,
) -> BigUint {
    peer_public.modpow(own_private, p)
}

impl KeyPair {
    /// Raw DH shared secret with a peer's public value.
    ///
    /// No validation happens here; peer values coming off the wire go through
    /// [`DomainParameters::validate_public_key`] first.
    pub fn dh_shared_secret(&self, peer_public: &BigUint, params: &DomainParameters) -> BigUint {
        compute_shared_secret(peer_public, &self.private_key, &params.p)
    }
}
