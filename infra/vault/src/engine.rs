use aead::Nonce;
use aead::inout::InOutBuf;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use getrandom::fill;
use std::sync::Arc;

use crate::builder::VaultBuilder;
use crate::error::VaultError;
use crate::types::{Aes, EncryptedSecret, NONCE_LEN, TAG_LEN, VaultCipher};

/// Inner vault state shared across handles.
#[allow(unreachable_pub)]
#[derive(Debug)]
pub struct VaultInner<C = Aes>
where
    C: VaultCipher,
{
    pub(crate) cipher: C,
}

/// A thread-safe handle for sealing and unsealing short secrets.
///
/// `Vault` wraps its cipher state in an [`Arc`], making it cheaply clonable
/// and safe to share across threads or asynchronous tasks. The key is fixed
/// at construction; there is no mutation after load, so concurrent
/// [`Vault::encrypt`] / [`Vault::decrypt`] calls need no locking.
///
/// ### Generic Parameters
/// * `C`: The cipher implementation. Defaults to [`Aes`] (AES-256-GCM) for
///   hardware acceleration support.
///
/// ### Example
/// ```rust
/// use odk_vault::prelude::*;
///
/// # fn main() -> Result<(), VaultError> {
/// let vault = Vault::<Aes>::builder().key(MasterKey::generate()).build()?;
///
/// let sealed = vault.encrypt("s3cret")?;
/// assert_eq!(vault.decrypt(&sealed)?, "s3cret");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Vault<C = Aes>
where
    C: VaultCipher,
{
    pub(crate) inner: Arc<VaultInner<C>>,
}

impl<C: VaultCipher> Clone for Vault<C> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<C> Vault<C>
where
    C: VaultCipher,
{
    /// Returns a new [`VaultBuilder`] to configure the vault.
    #[must_use]
    pub fn builder() -> VaultBuilder<C> {
        VaultBuilder::<C>::new()
    }

    /// Generates a fresh random nonce.
    ///
    /// Nonce reuse under the same key breaks confidentiality, so every seal
    /// draws new randomness from the system RNG.
    #[inline]
    fn next_nonce() -> Nonce<C> {
        let mut nonce = Nonce::<C>::default();
        fill(&mut nonce).expect("System RNG unavailable for nonce generation");
        nonce
    }

    /// Seals a plaintext secret into an opaque [`EncryptedSecret`].
    ///
    /// Two calls with identical plaintext produce different blobs.
    ///
    /// # Errors
    /// * [`VaultError::Encryption`] if the AEAD encryption fails.
    pub fn encrypt(&self, plaintext: &str) -> Result<EncryptedSecret, VaultError> {
        let bytes = plaintext.as_bytes();
        let nonce = Self::next_nonce();

        let mut buf = Vec::with_capacity(NONCE_LEN + bytes.len() + TAG_LEN);
        buf.extend_from_slice(&nonce);
        buf.extend_from_slice(bytes);

        let (_nonce_part, data_part) = buf.split_at_mut(NONCE_LEN);
        let in_out = InOutBuf::from(data_part);

        let tag = self.inner.cipher.encrypt_inout_detached(&nonce, b"", in_out).map_err(|_| {
            VaultError::Encryption {
                message: "AEAD encryption failed".into(),
                context: None,
            }
        })?;

        buf.extend_from_slice(tag.as_slice());
        Ok(EncryptedSecret::from_sealed(BASE64.encode(&buf)))
    }

    /// Unseals an [`EncryptedSecret`] back into its plaintext.
    ///
    /// Any tag mismatch (tampering, truncation, wrong key, corruption) fails
    /// closed; partial plaintext is never returned.
    ///
    /// # Errors
    /// * [`VaultError::MalformedPayload`] if the blob is not valid base64 or
    ///   is too short to contain a nonce and a tag.
    /// * [`VaultError::Authentication`] if the integrity check fails.
    pub fn decrypt(&self, secret: &EncryptedSecret) -> Result<String, VaultError> {
        let blob = BASE64.decode(secret.as_str()).map_err(|e| VaultError::MalformedPayload {
            message: "Payload is not valid base64".into(),
            context: Some(e.to_string().into()),
        })?;

        if blob.len() < NONCE_LEN + TAG_LEN {
            return Err(VaultError::MalformedPayload {
                message: format!(
                    "Payload too short ({} bytes). Expected at least {} bytes",
                    blob.len(),
                    NONCE_LEN + TAG_LEN
                )
                .into(),
                context: None,
            });
        }

        let (nonce_slice, rest) = blob.split_at(NONCE_LEN);
        let (ciphertext, tag_slice) = rest.split_at(rest.len() - TAG_LEN);

        let nonce = nonce_slice.try_into().map_err(|_| VaultError::MalformedPayload {
            message: "Invalid nonce length".into(),
            context: None,
        })?;

        let tag = tag_slice.try_into().map_err(|_| VaultError::MalformedPayload {
            message: "Invalid tag length".into(),
            context: None,
        })?;

        let mut buf = ciphertext.to_vec();
        let in_out = InOutBuf::from(&mut buf[..]);

        self.inner.cipher.decrypt_inout_detached(&nonce, b"", in_out, &tag).map_err(|_| {
            VaultError::Authentication {
                message: "AEAD authentication failed".into(),
                context: None,
            }
        })?;

        String::from_utf8(buf).map_err(|_| VaultError::MalformedPayload {
            message: "Decrypted payload is not valid UTF-8".into(),
            context: None,
        })
    }
}
