//! Protocol runners for one networked session.
//!
//! Message order is fixed per role. At every exchange step the listener sends first
//! and then receives; the initiator receives first and then sends. For MQV the
//! static public keys cross first, then the ephemeral ones. The two roles must agree
//! on this interleaving or the exchange deadlocks.
//!
//! Any failure aborts the session. Nothing is retried; a new attempt needs a new
//! `Session` and therefore new ephemeral keys.

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use log::{debug, info};
use num_bigint_dig::BigUint;
use rand::rngs::StdRng;

use crate::cipher::{Salsa20Cipher, StreamCipher};
use crate::config::{rng_from_seed, SessionConfig};
use crate::error::{Error, Result};
use crate::exchange::{KeyPair, MqvParty, MqvPublicKeys};
use crate::group::DomainParameters;
use crate::kdf::{derive_from_secret, DerivedKeyMaterial};
use crate::report::{measure, Reporter};
use crate::transport::Channel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Binds the port and accepts the peer (`dhmqv serve`).
    Listener,
    /// Connects to the listener (`dhmqv connect`).
    Initiator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Listener => f.write_str("Listener"),
            Role::Initiator => f.write_str("Initiator"),
        }
    }
}

/// The protocols both tools understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Plain Diffie-Hellman; full group or subgroup depending on the parameters.
    Dh,
    /// MQV with static and ephemeral keys.
    Mqv,
    /// MQV, then SHA-256 key derivation and a Salsa20-encrypted file transfer.
    MqvSha256Salsa20,
}

impl Protocol {
    pub fn name(&self) -> &'static str {
        match self {
            Protocol::Dh => "dh",
            Protocol::Mqv => "mqv",
            Protocol::MqvSha256Salsa20 => "mqv-sha256-salsa20",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dh" => Ok(Protocol::Dh),
            "mqv" => Ok(Protocol::Mqv),
            "mqv-sha256-salsa20" => Ok(Protocol::MqvSha256Salsa20),
            other => Err(Error::Config(format!("unknown protocol: {other}"))),
        }
    }
}

/// Labels for one send/receive step, used in error messages.
struct Step {
    send: &'static str,
    receive: &'static str,
}

const DH_PUBLIC: Step = Step {
    send: "sending the public key",
    receive: "receiving the peer's public key",
};

const MQV_STATIC: Step = Step {
    send: "sending the static public key",
    receive: "receiving the peer's static public key",
};

const MQV_EPHEMERAL: Step = Step {
    send: "sending the ephemeral public key",
    receive: "receiving the peer's ephemeral public key",
};

const PAYLOAD_SEND: &str = "sending the encrypted payload";
const PAYLOAD_RECEIVE: &str = "receiving the encrypted payload";

/// Result of a session-level key agreement.
#[derive(Debug, Clone)]
pub struct Agreement {
    /// The raw shared group element; feed it to [`Agreement::derive`] before use as a key.
    pub secret: BigUint,
    /// The peer's public values as received: one for DH, static then ephemeral for MQV.
    pub peer_public: Vec<BigUint>,
}

impl Agreement {
    pub fn secret_hex(&self) -> String {
        self.secret.to_str_radix(16)
    }

    pub fn derive(&self) -> DerivedKeyMaterial {
        derive_from_secret(&self.secret)
    }
}

pub struct Session<S: Read + Write> {
    channel: Channel<S>,
    params: DomainParameters,
    role: Role,
    rng: StdRng,
}

impl<S: Read + Write> Session<S> {
    /// Validate `params` with `config.primality_rounds` and set up the session.
    ///
    /// Nothing is sent until a protocol runner is called, so bad parameters never
    /// reach the peer.
    pub fn new(
        channel: Channel<S>,
        params: DomainParameters,
        role: Role,
        config: &SessionConfig,
    ) -> Result<Self> {
        let kind = params.validate(config.primality_rounds)?;
        debug!("{role}: session parameters validated ({kind})");
        Ok(Self {
            channel,
            params,
            role,
            rng: rng_from_seed(config.seed),
        })
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn params(&self) -> &DomainParameters {
        &self.params
    }

    pub fn into_channel(self) -> Channel<S> {
        self.channel
    }

    /// Send `own`, receive the peer's value, in the order the role dictates.
    fn swap_public(&mut self, own: &BigUint, step: &Step) -> Result<BigUint> {
        let peer = match self.role {
            Role::Listener => {
                self.channel.send_value(own, step.send)?;
                self.channel.receive_value(step.receive)?
            }
            Role::Initiator => {
                let peer = self.channel.receive_value(step.receive)?;
                self.channel.send_value(own, step.send)?;
                peer
            }
        };
        self.params.validate_public_key(&peer)?;
        debug!("{}: {} done", self.role, step.receive);
        Ok(peer)
    }

    /// Classical Diffie-Hellman with a fresh key pair.
    pub fn dh(&mut self, reporter: &mut dyn Reporter) -> Result<Agreement> {
        info!("{}: starting Diffie-Hellman key exchange", self.role);
        let params = &self.params;
        let rng = &mut self.rng;
        let own = measure(reporter, "Key pair", || KeyPair::generate_with_rng(params, rng));

        let peer = measure(reporter, "Exchange", || {
            self.swap_public(&own.public_key, &DH_PUBLIC)
        })?;

        let params = &self.params;
        let secret = measure(reporter, "Shared secret", || {
            own.dh_shared_secret(&peer, params)
        });
        Ok(Agreement {
            secret,
            peer_public: vec![peer],
        })
    }

    /// MQV using `static_keys` and a fresh ephemeral key pair.
    pub fn mqv(
        &mut self,
        static_keys: &KeyPair,
        reporter: &mut dyn Reporter,
    ) -> Result<Agreement> {
        info!("{}: starting MQV key exchange", self.role);
        let params = &self.params;
        let rng = &mut self.rng;
        let party = measure(reporter, "Ephemeral key", || {
            MqvParty::with_static(static_keys.clone(), params, rng)
        });

        let own = party.public_keys();
        let peer = measure(reporter, "Exchange", || -> Result<MqvPublicKeys> {
            let static_public = self.swap_public(&own.static_public, &MQV_STATIC)?;
            let ephemeral_public = self.swap_public(&own.ephemeral_public, &MQV_EPHEMERAL)?;
            Ok(MqvPublicKeys {
                static_public,
                ephemeral_public,
            })
        })?;

        let params = &self.params;
        let secret = measure(reporter, "Shared secret", || {
            party.shared_secret(&peer, params)
        });
        Ok(Agreement {
            secret,
            peer_public: vec![peer.static_public, peer.ephemeral_public],
        })
    }

    /// Encrypt `plaintext` under key material derived from `agreement` and send it.
    pub fn send_encrypted(
        &mut self,
        agreement: &Agreement,
        plaintext: &[u8],
        reporter: &mut dyn Reporter,
    ) -> Result<DerivedKeyMaterial> {
        let material = measure(reporter, "Derive key + iv", || agreement.derive());
        let mut cipher = measure(reporter, "Salsa20 init", || Salsa20Cipher::new(&material));

        let mut data = plaintext.to_vec();
        measure(reporter, "Encrypt", || cipher.apply_keystream(&mut data));
        measure(reporter, "Send", || self.channel.send_blob(&data, PAYLOAD_SEND))?;
        info!("{}: sent {} encrypted bytes", self.role, data.len());
        Ok(material)
    }

    /// Receive a payload and decrypt it under key material derived from `agreement`.
    pub fn receive_encrypted(
        &mut self,
        agreement: &Agreement,
        reporter: &mut dyn Reporter,
    ) -> Result<(Vec<u8>, DerivedKeyMaterial)> {
        let material = measure(reporter, "Derive key + iv", || agreement.derive());
        let mut cipher = measure(reporter, "Salsa20 init", || Salsa20Cipher::new(&material));

        let mut data = measure(reporter, "Receive", || {
            self.channel.receive_blob(PAYLOAD_RECEIVE)
        })?;
        measure(reporter, "Decrypt", || cipher.apply_keystream(&mut data));
        info!("{}: received {} encrypted bytes", self.role, data.len());
        Ok((data, material))
    }
}
