//! Safe-prime search.
//!
//! A safe prime is a prime `p` such that `q = (p - 1) / 2` is prime too. The search
//! samples `q` first, with its top bit forced so it has exactly the requested bit
//! length, and only then checks `p = 2q + 1`.

use log::debug;
use num_bigint_dig::{prime::probably_prime, BigUint, RandBigInt};
use num_traits::One;
use rand::Rng;

use crate::error::{Error, Result};

/// Probabilistic primality test with `rounds` Miller-Rabin iterations.
///
/// Values below 2 are never prime.
pub fn is_probable_prime(n: &BigUint, rounds: usize) -> bool {
    if *n < BigUint::from(2u32) {
        return false;
    }
    probably_prime(n, rounds)
}

/// Sample a random odd integer of exactly `bits` bits.
fn random_odd_with_top_bit<R: Rng + ?Sized>(rng: &mut R, bits: usize) -> BigUint {
    let candidate = rng.gen_biguint(bits);
    candidate | (BigUint::one() << (bits - 1)) | BigUint::one()
}

/// Generate a safe-prime pair `(q, p)` with `p = 2q + 1` and `q` of exactly `q_bits` bits.
///
/// Loops until both numbers pass `rounds` Miller-Rabin iterations. With
/// `max_attempts` set, returns [`Error::GenerationExhausted`] once that many
/// candidates for `q` have been drawn.
pub fn generate_safe_prime_pair<R: Rng + ?Sized>(
    q_bits: usize,
    rounds: usize,
    max_attempts: Option<usize>,
    rng: &mut R,
) -> Result<(BigUint, BigUint)> {
    if q_bits < 2 {
        return Err(Error::Config(format!(
            "q must have at least 2 bits, got {q_bits}"
        )));
    }

    let mut attempts = 0usize;
    loop {
        if max_attempts.is_some_and(|max| attempts >= max) {
            return Err(Error::GenerationExhausted { attempts });
        }
        attempts += 1;

        let q = random_odd_with_top_bit(rng, q_bits);
        if !is_probable_prime(&q, rounds) {
            continue;
        }

        let p = (&q << 1usize) + BigUint::one();
        if is_probable_prime(&p, rounds) {
            debug!(
                "found {}-bit safe prime after {} candidates",
                p.bits(),
                attempts
            );
            return Ok((q, p));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::rng_from_seed;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_small_primes() {
        let primes = [2u32, 3, 5, 7, 11, 23, 47, 7919];
        for p in primes {
            assert!(is_probable_prime(&BigUint::from(p), 25), "{p} is prime");
        }
        let composites = [0u32, 1, 4, 9, 15, 21, 561, 7917];
        for c in composites {
            assert!(!is_probable_prime(&BigUint::from(c), 25), "{c} is composite");
        }
    }

    #[test]
    fn test_safe_prime_pair_has_exact_bit_length() {
        let mut rng = rng_from_seed(Some(42));
        for bits in [8usize, 16, 32, 64] {
            let (q, p) = generate_safe_prime_pair(bits, 25, None, &mut rng).unwrap();
            assert_eq!(q.bits(), bits);
            assert_eq!(p, &q * BigUint::from(2u32) + BigUint::one());
            assert!(is_probable_prime(&q, 25));
            assert!(is_probable_prime(&p, 25));
        }
    }

    #[test]
    fn test_safe_prime_pair_256_bits() {
        let mut rng = rng_from_seed(Some(2024));
        let (q, p) = generate_safe_prime_pair(256, 25, None, &mut rng).unwrap();
        assert_eq!(q.bits(), 256);
        assert_eq!(p.bits(), 257);
        assert!(is_probable_prime(&q, 25));
        assert!(is_probable_prime(&p, 25));
    }

    #[test]
    fn test_two_bit_request_yields_three_and_seven() {
        let mut rng = rng_from_seed(Some(1));
        let (q, p) = generate_safe_prime_pair(2, 25, None, &mut rng).unwrap();
        assert_eq!(q, BigUint::from(3u32));
        assert_eq!(p, BigUint::from(7u32));
    }

    #[test]
    fn test_rejects_too_few_bits() {
        let mut rng = rng_from_seed(Some(1));
        assert!(matches!(
            generate_safe_prime_pair(1, 25, None, &mut rng),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_attempt_cap() {
        // An all-zero RNG always draws q = 2^63 + 1, which 3 divides.
        let mut rng = StepRng::new(0, 0);
        assert!(matches!(
            generate_safe_prime_pair(64, 25, Some(5), &mut rng),
            Err(Error::GenerationExhausted { attempts: 5 })
        ));
        assert!(matches!(
            generate_safe_prime_pair(64, 25, Some(0), &mut rng),
            Err(Error::GenerationExhausted { attempts: 0 })
        ));
    }

    #[test]
    fn test_cap_not_hit_on_success() {
        // Two bits leave a single candidate: q = 3, p = 7.
        let mut rng = StepRng::new(0, 0);
        let (q, p) = generate_safe_prime_pair(2, 25, Some(1), &mut rng).unwrap();
        assert_eq!((q, p), (BigUint::from(3u32), BigUint::from(7u32)));
    }
}
