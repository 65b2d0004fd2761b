use aead::{AeadInOut, KeyInit};
use aes_gcm::Aes256Gcm;
use chacha20poly1305::ChaCha20Poly1305;
use serde::{Deserialize, Serialize};
use std::fmt;

// --- Aliases ---

pub type Aes = Aes256Gcm;
pub type ChaCha = ChaCha20Poly1305;

pub trait VaultCipher: AeadInOut + KeyInit + 'static {}
impl<T: AeadInOut + KeyInit + 'static> VaultCipher for T {}

// --- Payload format constants ---

/// AEAD nonce length (96-bit).
pub(crate) const NONCE_LEN: usize = 12;

/// AEAD tag length (128-bit).
pub(crate) const TAG_LEN: usize = 16;

/// Required key length for the 256-bit ciphers this vault supports.
pub(crate) const KEY_LEN: usize = 32;

// --- Container ---

/// An opaque, storage-safe sealed secret.
///
/// The underlying string is the base64 encoding of
/// `[NONCE(12)][CIPHERTEXT(N)][TAG(16)]`. The wrapper exists so that a
/// sealed credential cannot be confused with its plaintext anywhere in the
/// data model; nothing about the plaintext (not even equality between two
/// stored values) is observable from it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncryptedSecret(String);

impl EncryptedSecret {
    /// Wraps an already-sealed blob, e.g. one read back from storage.
    #[must_use]
    pub const fn from_sealed(blob: String) -> Self {
        Self(blob)
    }

    /// Returns the sealed blob as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the sealed blob.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for EncryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The blob is ciphertext, but keep debug output short.
        f.debug_tuple("EncryptedSecret").field(&format!("{} chars", self.0.len())).finish()
    }
}

impl fmt::Display for EncryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EncryptedSecret {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<EncryptedSecret> for String {
    fn from(secret: EncryptedSecret) -> Self {
        secret.0
    }
}
