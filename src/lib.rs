//! Diffie-Hellman and MQV key agreement over safe-prime groups.
//!
//! DISCLAIMER: this crate is a teaching implementation of finite-field key agreement.
//! It is not audited and offers no protection against active impersonation: static
//! MQV keys are not bound to any identity. Do not use it to protect real data.
//!
//! The pieces, leaves first:
//! - [`group`]: safe-prime generation, generator search, [`DomainParameters`].
//! - [`exchange`]: [`KeyPair`], classical DH and MQV.
//! - [`kdf`]: SHA-256 derivation of a 256-bit key and 64-bit IV.
//! - [`cipher`]: the stream cipher seam (Salsa20).
//! - [`transport`]: hex-line and length-prefixed framing over a blocking channel.
//! - [`session`]: listener/initiator runners for `dh`, `mqv` and
//!   `mqv-sha256-salsa20`.
//!
//! ```
//! use dhmqv::{DomainParameters, GroupConfig, KeyGenConfig, MqvParty};
//!
//! let params = DomainParameters::generate(&GroupConfig {
//!     q_bits: 64,
//!     seed: Some(1),
//!     ..GroupConfig::default()
//! })
//! .unwrap();
//!
//! let alice = MqvParty::generate(&params, &KeyGenConfig::default());
//! let bob = MqvParty::generate(&params, &KeyGenConfig::default());
//! assert_eq!(
//!     alice.shared_secret(&bob.public_keys(), &params),
//!     bob.shared_secret(&alice.public_keys(), &params),
//! );
//! ```

pub mod cipher;
pub mod config;
pub mod error;
pub mod exchange;
pub mod group;
pub mod kdf;
pub mod report;
pub mod session;
pub mod transport;

pub use config::{GroupConfig, KeyGenConfig, SessionConfig};
pub use error::{Error, Result};
pub use exchange::{KeyPair, MqvParty, MqvPublicKeys};
pub use group::{DomainParameters, GroupKind, ParameterSet};
pub use kdf::{derive_symmetric_material, DerivedKeyMaterial};
pub use report::{NoopReporter, Reporter, TimingTable};
pub use session::{Agreement, Protocol, Role, Session};
pub use transport::Channel;
