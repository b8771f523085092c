//! Stream cipher seam for the hybrid file transfer.
//!
//! Sessions only see the [`StreamCipher`] trait; [`Salsa20Cipher`] is the concrete
//! keystream used by the `mqv-sha256-salsa20` protocol (256-bit key, 64-bit IV).

use salsa20::cipher::{KeyIvInit, StreamCipher as _};
use salsa20::Salsa20;

use crate::kdf::DerivedKeyMaterial;

/// A keystream cipher: encryption and decryption are the same XOR.
pub trait StreamCipher {
    fn apply_keystream(&mut self, buf: &mut [u8]);
}

pub struct Salsa20Cipher {
    inner: Salsa20,
}

impl Salsa20Cipher {
    pub fn new(material: &DerivedKeyMaterial) -> Self {
        let inner = Salsa20::new(&material.key.into(), &material.iv.into());
        Self { inner }
    }
}

impl StreamCipher for Salsa20Cipher {
    fn apply_keystream(&mut self, buf: &mut [u8]) {
        self.inner.apply_keystream(buf);
    }
}
