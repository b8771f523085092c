//! Domain parameters `(p, q, g)` and their plain-text exchange format.
//!
//! The file format is three lines of lowercase hex without a prefix: `p`, then `q`,
//! then `g`. Both peers load the same file before any exchange.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::{debug, warn};
use num_bigint_dig::BigUint;
use num_traits::{One, Zero};
use rand::Rng;

use super::generator::{
    find_full_group_generator, find_subgroup_generator, is_full_group_generator,
    is_subgroup_generator,
};
use super::prime::{generate_safe_prime_pair, is_probable_prime};
use crate::config::{rng_from_seed, GroupConfig};
use crate::error::{Error, Result};

/// Which group the generator `g` spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// The whole multiplicative group mod `p`, of order `p - 1`.
    FullGroup,
    /// The prime-order subgroup, of order `q`.
    Subgroup,
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKind::FullGroup => f.write_str("full multiplicative group"),
            GroupKind::Subgroup => f.write_str("prime-order subgroup"),
        }
    }
}

/// The agreed `(p, q, g)` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainParameters {
    /// Safe prime field modulus, `p = 2q + 1`.
    pub p: BigUint,
    /// Prime subgroup order.
    pub q: BigUint,
    /// Generator of either the full group or the order-`q` subgroup.
    pub g: BigUint,
}

/// Both parameter files the generator tool writes, sharing one safe prime.
#[derive(Debug, Clone)]
pub struct ParameterSet {
    /// `g` is the smallest primitive root; written to `multiplicative_params.txt`.
    pub full_group: DomainParameters,
    /// `g` spans the order-`q` subgroup; written to `cyclic_params.txt`.
    pub subgroup: DomainParameters,
}

/// Parse one hex field, tolerating surrounding whitespace and an optional `0x`.
pub(crate) fn parse_hex(field: &'static str, text: &str) -> Result<BigUint> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(Error::malformed(field, "empty value"));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::malformed(field, "not a hexadecimal number"));
    }
    BigUint::parse_bytes(digits.as_bytes(), 16)
        .ok_or_else(|| Error::malformed(field, "not a hexadecimal number"))
}

impl DomainParameters {
    /// Wrap a triple without validating it. Call [`validate`](Self::validate) before use
    /// with untrusted input.
    pub fn new(p: BigUint, q: BigUint, g: BigUint) -> Self {
        Self { p, q, g }
    }

    /// Generate a fresh safe prime and a generator of the configured kind.
    pub fn generate(config: &GroupConfig) -> Result<Self> {
        let mut rng = rng_from_seed(config.seed);
        let (q, p) = generate_safe_prime_pair(
            config.q_bits,
            config.primality_rounds,
            config.max_attempts,
            &mut rng,
        )?;
        let g = Self::find_generator(config.kind, &q, &p, &mut rng)?;
        Ok(Self { p, q, g })
    }

    /// Generate one safe prime and both generators for it.
    pub fn generate_set(config: &GroupConfig) -> Result<ParameterSet> {
        let mut rng = rng_from_seed(config.seed);
        let (q, p) = generate_safe_prime_pair(
            config.q_bits,
            config.primality_rounds,
            config.max_attempts,
            &mut rng,
        )?;
        let full_g = find_full_group_generator(&q, &p)?;
        let sub_g = find_subgroup_generator(&q, &p, &mut rng)?;
        Ok(ParameterSet {
            full_group: Self::new(p.clone(), q.clone(), full_g),
            subgroup: Self::new(p, q, sub_g),
        })
    }

    fn find_generator<R: Rng + ?Sized>(
        kind: GroupKind,
        q: &BigUint,
        p: &BigUint,
        rng: &mut R,
    ) -> Result<BigUint> {
        match kind {
            GroupKind::FullGroup => find_full_group_generator(q, p),
            GroupKind::Subgroup => find_subgroup_generator(q, p, rng),
        }
    }

    /// Classify the generator. Assumes validated parameters.
    pub fn kind(&self) -> GroupKind {
        if self.g.modpow(&self.q, &self.p).is_one() {
            GroupKind::Subgroup
        } else {
            GroupKind::FullGroup
        }
    }

    /// Order of `g`: `q` for the subgroup, `p - 1` for the full group.
    pub fn order(&self) -> BigUint {
        match self.kind() {
            GroupKind::Subgroup => self.q.clone(),
            GroupKind::FullGroup => &self.p - 1u32,
        }
    }

    /// Check every invariant of the triple and report which group `g` spans.
    pub fn validate(&self, rounds: usize) -> Result<GroupKind> {
        let one = BigUint::one();
        let two = BigUint::from(2u32);

        if self.q < two {
            return Err(Error::invalid_parameters("q must be at least 2"));
        }
        if self.p != (&self.q << 1usize) + &one {
            return Err(Error::invalid_parameters("p is not 2q + 1"));
        }
        if !is_probable_prime(&self.q, rounds) {
            return Err(Error::invalid_parameters("q is not prime"));
        }
        if !is_probable_prime(&self.p, rounds) {
            return Err(Error::invalid_parameters("p is not prime"));
        }
        let p_minus_1 = &self.p - &one;
        if self.g < two || self.g >= p_minus_1 {
            return Err(Error::invalid_parameters("g must lie in [2, p - 2]"));
        }
        if !self.g.modpow(&p_minus_1, &self.p).is_one() {
            return Err(Error::invalid_parameters("g^(p-1) mod p != 1"));
        }

        let kind = if is_subgroup_generator(&self.g, &self.q, &self.p) {
            GroupKind::Subgroup
        } else if is_full_group_generator(&self.g, &self.q, &self.p) {
            GroupKind::FullGroup
        } else {
            return Err(Error::invalid_parameters("g generates neither group"));
        };
        debug!(
            "validated {}-bit domain parameters ({})",
            self.p.bits(),
            kind
        );
        Ok(kind)
    }

    /// Reject peer public values that are outside the group `g` spans.
    ///
    /// The value must lie in `[2, p - 2]`, which rules out the order-1 and order-2
    /// elements; with subgroup parameters it must also satisfy `y^q == 1`.
    pub fn validate_public_key(&self, y: &BigUint) -> Result<()> {
        let p_minus_1 = &self.p - 1u32;
        if *y <= BigUint::one() || *y >= p_minus_1 {
            warn!("peer public value outside [2, p - 2]");
            return Err(Error::InvalidPublicKey("outside [2, p - 2]".into()));
        }
        if self.kind() == GroupKind::Subgroup && !y.modpow(&self.q, &self.p).is_one() {
            warn!("peer public value not in the order-q subgroup");
            return Err(Error::InvalidPublicKey(
                "not a member of the order-q subgroup".into(),
            ));
        }
        Ok(())
    }

    /// Render the three-line exchange format.
    pub fn to_text(&self) -> String {
        format!(
            "{}\n{}\n{}\n",
            self.p.to_str_radix(16),
            self.q.to_str_radix(16),
            self.g.to_str_radix(16)
        )
    }

    /// Write the exchange format to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_text())?;
        Ok(())
    }

    /// Read and validate parameters from `path`.
    pub fn load(path: impl AsRef<Path>, rounds: usize) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let params: Self = text.parse()?;
        params.validate(rounds)?;
        Ok(params)
    }
}

impl FromStr for DomainParameters {
    type Err = Error;

    /// Parse the three-line format without validating the values.
    fn from_str(s: &str) -> Result<Self> {
        let mut lines = s.lines();
        let mut next = |field: &'static str| -> Result<BigUint> {
            let line = lines
                .next()
                .ok_or_else(|| Error::malformed(field, "missing line"))?;
            parse_hex(field, line)
        };
        let p = next("p")?;
        let q = next("q")?;
        let g = next("g")?;
        if p.is_zero() || q.is_zero() {
            return Err(Error::invalid_parameters("p and q must be non-zero"));
        }
        Ok(Self { p, q, g })
    }
}
