//! MQV (Menezes-Qu-Vanstone) key agreement.
//!
//! Each party holds a long-lived static key pair `(a, A)` and a per-session
//! ephemeral key pair `(x, X)`. With `l = floor(bits(q) / 2)`:
//!
//! ```text
//!   d = 2^l + (X_own  mod 2^l)
//!   e = 2^l + (X_peer mod 2^l)
//!   s = (x + d * a) mod n
//!   T = X_peer * A_peer^e mod p
//!   K = T^s mod p
//! ```
//!
//! where `n` is the order of `g`. Both sides telescope to
//! `g^((x_a + d_a * a_a) * (x_b + d_b * a_b))`, so the truncation and the
//! mod-then-add order must match on both peers bit for bit. A mismatch is silent:
//! the parties just end up with different secrets.
//!
//! Static public keys are not bound to any identity here. MQV only authenticates
//! to the extent that the peer's static key was obtained out of band.

use log::trace;
use num_bigint_dig::BigUint;
use num_traits::One;
use rand::Rng;

use super::KeyPair;
use crate::config::{rng_from_seed, KeyGenConfig};
use crate::group::DomainParameters;

/// `l = floor(bits(q) / 2)`, the truncation width of the implicit signature.
pub fn truncation_bits(q: &BigUint) -> usize {
    q.bits() / 2
}

/// `2^l + (public mod 2^l)`. Never zero, so the static key always contributes.
pub fn implicit_coefficient(public: &BigUint, l: usize) -> BigUint {
    let pow2_l = BigUint::one() << l;
    let low = public % &pow2_l;
    pow2_l + low
}

/// MQV shared secret from one party's point of view.
pub fn compute_mqv_shared_secret(
    own_static: &KeyPair,
    own_ephemeral: &KeyPair,
    peer_static_public: &BigUint,
    peer_ephemeral_public: &BigUint,
    params: &DomainParameters,
) -> BigUint {
    let l = truncation_bits(&params.q);
    let d = implicit_coefficient(&own_ephemeral.public_key, l);
    let e = implicit_coefficient(peer_ephemeral_public, l);

    let order = params.order();
    let exponent = (&own_ephemeral.private_key + &d * &own_static.private_key) % &order;

    let base = (peer_ephemeral_public * peer_static_public.modpow(&e, &params.p)) % &params.p;
    trace!("mqv: l = {}, exponent has {} bits", l, exponent.bits());

    base.modpow(&exponent, &params.p)
}

/// The two public values a party puts on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqvPublicKeys {
    /// Long-lived public value `A = g^a mod p`.
    pub static_public: BigUint,
    /// Per-session public value `X = g^x mod p`.
    pub ephemeral_public: BigUint,
}

/// One party's keys for a single MQV session.
#[derive(Debug, Clone)]
pub struct MqvParty {
    /// Reused across sessions.
    pub static_keys: KeyPair,
    /// Fresh for this session.
    pub ephemeral_keys: KeyPair,
}

impl MqvParty {
    pub fn new(static_keys: KeyPair, ephemeral_keys: KeyPair) -> Self {
        Self {
            static_keys,
            ephemeral_keys,
        }
    }

    /// Reuse an existing static key pair with a fresh ephemeral one.
    pub fn with_static<R: Rng + ?Sized>(
        static_keys: KeyPair,
        params: &DomainParameters,
        rng: &mut R,
    ) -> Self {
        let ephemeral_keys = KeyPair::generate_with_rng(params, rng);
        Self::new(static_keys, ephemeral_keys)
    }

    /// Fresh static and ephemeral key pairs.
    pub fn generate(params: &DomainParameters, config: &KeyGenConfig) -> Self {
        let mut rng = rng_from_seed(config.seed);
        let static_keys = KeyPair::generate_with_rng(params, &mut rng);
        Self::with_static(static_keys, params, &mut rng)
    }

    pub fn public_keys(&self) -> MqvPublicKeys {
        MqvPublicKeys {
            static_public: self.static_keys.public_key.clone(),
            ephemeral_public: self.ephemeral_keys.public_key.clone(),
        }
    }

    pub fn shared_secret(&self, peer: &MqvPublicKeys, params: &DomainParameters) -> BigUint {
        compute_mqv_shared_secret(
            &self.static_keys,
            &self.ephemeral_keys,
            &peer.static_public,
            &peer.ephemeral_public,
            params,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupConfig;
    use crate::group::GroupKind;
    use crate::kdf::derive_from_secret;

    fn params(kind: GroupKind, bits: usize, seed: u64) -> DomainParameters {
        DomainParameters::generate(&GroupConfig {
            q_bits: bits,
            kind,
            seed: Some(seed),
            ..GroupConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_implicit_coefficient() {
        // l = 4: 2^4 + (0b1011_0110 mod 16) = 16 + 6
        assert_eq!(
            implicit_coefficient(&BigUint::from(0b1011_0110u32), 4),
            BigUint::from(22u32)
        );
        // Zero low bits still give 2^l.
        assert_eq!(
            implicit_coefficient(&BigUint::from(0b1_0000u32), 4),
            BigUint::from(16u32)
        );
        assert_eq!(truncation_bits(&BigUint::from(11u32)), 2);
    }

    #[test]
    fn test_hand_computed_toy_group() {
        // p = 23, q = 11, g = 4. l = floor(4 / 2) = 2.
        let params = DomainParameters::new(23u32.into(), 11u32.into(), 4u32.into());
        let key = |x: u32| KeyPair::from_private(BigUint::from(x), &params);

        let alice = MqvParty::new(key(3), key(5));
        let bob = MqvParty::new(key(7), key(2));

        let a = alice.shared_secret(&bob.public_keys(), &params);
        let b = bob.shared_secret(&alice.public_keys(), &params);
        assert_eq!(a, b);

        // Alice: A = 4^3 = 18, X = 4^5 = 12; Bob: B = 4^7 = 8, Y = 4^2 = 16.
        // d = 4 + (12 mod 4) = 4, e = 4 + (16 mod 4) = 4.
        // s_a = (5 + 4 * 3) mod 11 = 6, s_b = (2 + 4 * 7) mod 11 = 8.
        // K = g^(s_a * s_b) = 4^48 = 4^(48 mod 11) = 4^4 = 3.
        assert_eq!(a, BigUint::from(3u32));
    }

    #[test]
    fn test_mqv_agreement_subgroup() {
        let params = params(GroupKind::Subgroup, 64, 31);
        let alice = MqvParty::generate(&params, &KeyGenConfig { seed: Some(1) });
        let bob = MqvParty::generate(&params, &KeyGenConfig { seed: Some(2) });
        assert_eq!(
            alice.shared_secret(&bob.public_keys(), &params),
            bob.shared_secret(&alice.public_keys(), &params)
        );
    }

    #[test]
    fn test_mqv_agreement_full_group() {
        let params = params(GroupKind::FullGroup, 64, 32);
        for seed in 0..8u64 {
            let alice = MqvParty::generate(&params, &KeyGenConfig { seed: Some(seed) });
            let bob = MqvParty::generate(&params, &KeyGenConfig { seed: Some(seed + 100) });
            assert_eq!(
                alice.shared_secret(&bob.public_keys(), &params),
                bob.shared_secret(&alice.public_keys(), &params)
            );
        }
    }

    #[test]
    fn test_mqv_round_trip_256_bits() {
        for (kind, seed) in [(GroupKind::Subgroup, 256u64), (GroupKind::FullGroup, 257)] {
            let params = params(kind, 256, seed);
            let alice = MqvParty::generate(&params, &KeyGenConfig { seed: Some(seed + 1) });
            let bob = MqvParty::generate(&params, &KeyGenConfig { seed: Some(seed + 2) });

            let a = alice.shared_secret(&bob.public_keys(), &params);
            let b = bob.shared_secret(&alice.public_keys(), &params);
            assert_eq!(a, b, "{kind}: MQV secrets must match");
            assert!(a > BigUint::one() && a < params.p);

            let a_material = derive_from_secret(&a);
            let b_material = derive_from_secret(&b);
            assert_eq!(a_material.key, b_material.key);
            assert_eq!(a_material.iv, b_material.iv);
        }
    }

    #[test]
    fn test_static_key_reused_across_sessions() {
        let params = params(GroupKind::Subgroup, 64, 33);
        let mut rng = rng_from_seed(Some(8));
        let alice_static = KeyPair::generate_with_rng(&params, &mut rng);
        let bob_static = KeyPair::generate_with_rng(&params, &mut rng);

        let mut secrets = Vec::new();
        for _ in 0..3 {
            let alice = MqvParty::with_static(alice_static.clone(), &params, &mut rng);
            let bob = MqvParty::with_static(bob_static.clone(), &params, &mut rng);
            let a = alice.shared_secret(&bob.public_keys(), &params);
            assert_eq!(a, bob.shared_secret(&alice.public_keys(), &params));
            secrets.push(a);
        }
        // Fresh ephemerals give fresh secrets.
        assert_ne!(secrets[0], secrets[1]);
        assert_ne!(secrets[1], secrets[2]);
    }

    #[test]
    fn test_wrong_static_key_gives_silent_mismatch() {
        let params = params(GroupKind::Subgroup, 64, 34);
        let alice = MqvParty::generate(&params, &KeyGenConfig { seed: Some(5) });
        let bob = MqvParty::generate(&params, &KeyGenConfig { seed: Some(6) });
        let mallory = MqvParty::generate(&params, &KeyGenConfig { seed: Some(7) });

        // Alice believes Bob's static key is Mallory's.
        let forged = MqvPublicKeys {
            static_public: mallory.static_keys.public_key.clone(),
            ephemeral_public: bob.ephemeral_keys.public_key.clone(),
        };
        let alice_secret = alice.shared_secret(&forged, &params);
        let bob_secret = bob.shared_secret(&alice.public_keys(), &params);
        assert_ne!(alice_secret, bob_secret);
    }
}
