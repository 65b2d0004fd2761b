use crate::error::VaultError;
use crate::types::KEY_LEN;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A 256-bit vault key held only in memory.
///
/// The key is supplied once at process start from an external configuration
/// source and never persisted by this crate. Raw key bytes are zeroized when
/// the value is dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; KEY_LEN]);

impl MasterKey {
    /// Decodes a key from its base64 configuration form.
    ///
    /// # Errors
    /// Returns [`VaultError::KeyUnavailable`] if the value is empty, is not
    /// valid base64, or does not decode to exactly 32 bytes. Rejecting the
    /// key here makes a misconfigured vault fail at startup instead of
    /// degrading silently.
    pub fn from_base64(encoded: &str) -> Result<Self, VaultError> {
        if encoded.trim().is_empty() {
            return Err(VaultError::KeyUnavailable {
                message: "No encryption key configured".into(),
                context: None,
            });
        }

        let mut decoded = BASE64.decode(encoded.trim()).map_err(|e| {
            VaultError::KeyUnavailable {
                message: "Encryption key is not valid base64".into(),
                context: Some(e.to_string().into()),
            }
        })?;

        if decoded.len() != KEY_LEN {
            let got = decoded.len();
            decoded.zeroize();
            return Err(VaultError::KeyUnavailable {
                message: format!("Encryption key must decode to {KEY_LEN} bytes, got {got}")
                    .into(),
                context: None,
            });
        }

        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();

        Ok(Self(bytes))
    }

    /// Generates a fresh random 256-bit key from the system RNG.
    ///
    /// # Panics
    /// Panics if the system RNG is unavailable.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        getrandom::fill(&mut bytes).expect("System RNG unavailable for key generation");
        Self(bytes)
    }

    /// Encodes the key in the base64 form expected by configuration.
    #[must_use]
    pub fn to_base64(&self) -> String {
        BASE64.encode(self.0)
    }

    pub(crate) const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("MasterKey").field(&"[redacted]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD as BASE64;

    #[test]
    fn roundtrips_through_base64() {
        let key = MasterKey::generate();
        let restored = MasterKey::from_base64(&key.to_base64()).unwrap();
        assert_eq!(key.as_bytes(), restored.as_bytes());
    }

    #[test]
    fn rejects_empty_value() {
        assert!(matches!(
            MasterKey::from_base64(""),
            Err(VaultError::KeyUnavailable { .. })
        ));
    }

    #[test]
    fn rejects_wrong_lengths() {
        for len in [16, 24, 33] {
            let encoded = BASE64.encode(vec![0u8; len]);
            assert!(
                matches!(MasterKey::from_base64(&encoded), Err(VaultError::KeyUnavailable { .. })),
                "{len}-byte key should be rejected"
            );
        }
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            MasterKey::from_base64("not-base-64!!!"),
            Err(VaultError::KeyUnavailable { .. })
        ));
    }
}
