//! Prime-order group generation and domain parameters.
//!
//! Everything here works over a safe prime `p = 2q + 1`. The generator `g` spans
//! either the full multiplicative group (order `p - 1`) or the subgroup of prime
//! order `q`; [`GroupKind`] tells the two apart.

pub mod generator;
pub mod params;
pub mod prime;

pub use generator::{
    find_full_group_generator, find_subgroup_generator, is_full_group_generator,
    is_subgroup_generator,
};
pub use params::{DomainParameters, GroupKind, ParameterSet};
pub use prime::{generate_safe_prime_pair, is_probable_prime};
