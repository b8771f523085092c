//! Generator search for the two group shapes over a safe prime `p = 2q + 1`.
//!
//! The multiplicative group mod `p` has order `p - 1 = 2q`, whose only prime factors
//! are 2 and `q`. An element `g` generates the full group iff `g^2 != 1` and
//! `g^q != 1`, so the primitive-root test below is complete, not a heuristic.
//! For `g` in `[2, p - 2]` the `g^2` check always passes, so the search returns the
//! same `g` as a search that only checks `g^q`.
//!
//! The order-`q` subgroup is the set of quadratic residues; any `r^((p-1)/q) != 1`
//! generates it because `q` is prime.

use num_bigint_dig::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;

use crate::error::{Error, Result};

/// `g` generates the whole group of order `p - 1` (for a safe prime `p = 2q + 1`).
pub fn is_full_group_generator(g: &BigUint, q: &BigUint, p: &BigUint) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let g = g % p;
    !g.is_zero() && g.modpow(&two, p) != one && g.modpow(q, p) != one
}

/// `g` generates the subgroup of prime order `q`.
pub fn is_subgroup_generator(g: &BigUint, q: &BigUint, p: &BigUint) -> bool {
    let one = BigUint::one();
    (g % p) != one && !(g % p).is_zero() && g.modpow(q, p) == one
}

/// Smallest primitive root of the safe prime `p = 2q + 1`, searching upward from 2.
pub fn find_full_group_generator(q: &BigUint, p: &BigUint) -> Result<BigUint> {
    let mut g = BigUint::from(2u32);
    while g < *p {
        if is_full_group_generator(&g, q, p) {
            return Ok(g);
        }
        g += 1u32;
    }
    Err(Error::invalid_parameters(
        "no primitive root found; p is not a safe prime 2q + 1",
    ))
}

/// Random generator of the order-`q` subgroup: `g = r^((p-1)/q) mod p`, resampling
/// `r` from `[1, p-1]` while `g == 1`.
pub fn find_subgroup_generator<R: Rng + ?Sized>(
    q: &BigUint,
    p: &BigUint,
    rng: &mut R,
) -> Result<BigUint> {
    let one = BigUint::one();
    if q <= &one || p <= q {
        return Err(Error::invalid_parameters("need 1 < q < p"));
    }
    let p_minus_1 = p - &one;
    let (cofactor, rem) = p_minus_1.div_rem(q);
    if !rem.is_zero() {
        return Err(Error::invalid_parameters("q does not divide p - 1"));
    }

    loop {
        let r = rng.gen_biguint_range(&one, p);
        let g = r.modpow(&cofactor, p);
        if g != one {
            return Ok(g);
        }
    }
}
