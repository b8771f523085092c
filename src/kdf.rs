//! Turn a raw shared secret into stream-cipher key material.
//!
//! ```text
//!   hashed = SHA-256(secret_hex)
//!   key    = hashed[0..32]
//!   iv     = SHA-256(hex(hashed) || "IV")[0..8]
//! ```
//!
//! `secret_hex` is the lowercase, unprefixed hex form the wire encoder produces,
//! so both peers hash the exact same bytes without exchanging anything else.

use num_bigint_dig::BigUint;
use sha2::{Digest, Sha256};

pub const KEY_LEN: usize = 32;
pub const IV_LEN: usize = 8;

/// Key and IV for a 256-bit-key, 64-bit-IV stream cipher.
#[derive(Clone, PartialEq, Eq)]
pub struct DerivedKeyMaterial {
    /// The raw SHA-256 digest of the secret's hex text.
    pub key: [u8; KEY_LEN],
    /// First 8 bytes of `SHA-256(hashed_secret || "IV")`.
    pub iv: [u8; IV_LEN],
    /// Hex of `SHA-256(secret_hex)`, handy for comparing secrets out of band.
    pub hashed_secret: String,
}

impl std::fmt::Debug for DerivedKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKeyMaterial")
            .field("key", &"<redacted>")
            .field("iv", &hex::encode(self.iv))
            .finish()
    }
}

/// Derive key and IV from the hex text of a shared secret.
pub fn derive_symmetric_material(shared_secret_hex: &str) -> DerivedKeyMaterial {
    let hashed = Sha256::digest(shared_secret_hex.as_bytes());
    let hashed_secret = hex::encode(hashed);

    let mut key = [0u8; KEY_LEN];
    let n = hashed.len().min(KEY_LEN);
    key[..n].copy_from_slice(&hashed[..n]);

    let mut iv_hasher = Sha256::new();
    iv_hasher.update(hashed_secret.as_bytes());
    iv_hasher.update(b"IV");
    let iv_hash = iv_hasher.finalize();

    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&iv_hash[..IV_LEN]);

    DerivedKeyMaterial {
        key,
        iv,
        hashed_secret,
    }
}

/// Derive key material straight from the secret value.
pub fn derive_from_secret(secret: &BigUint) -> DerivedKeyMaterial {
    derive_symmetric_material(&secret.to_str_radix(16))
}
