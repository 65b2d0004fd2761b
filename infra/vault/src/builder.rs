use crate::engine::{Vault, VaultInner};
use crate::error::VaultError;
use crate::key::MasterKey;
use crate::types::{Aes, VaultCipher};
use aead::Key;
use private::Sealed;
use std::marker::PhantomData;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct NoKey;
#[derive(Debug)]
pub struct WithKey(MasterKey);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoKey {}
impl Sealed for WithKey {}

/// A builder for secure initialization of the [`Vault`].
///
/// The builder takes ownership of the [`MasterKey`]; the raw key material is
/// zeroized as soon as the cipher has been initialized.
#[allow(private_bounds)]
#[derive(Debug)]
pub struct VaultBuilder<C: VaultCipher = Aes, K: Sealed = NoKey> {
    _cipher: PhantomData<C>,
    key: K,
}

impl<C: VaultCipher> Default for VaultBuilder<C> {
    fn default() -> Self {
        Self { _cipher: PhantomData, key: NoKey }
    }
}

impl<C: VaultCipher> VaultBuilder<C> {
    /// Creates a new empty builder.
    #[must_use = "Builder must be given a key before use"]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supplies the process-wide static key.
    ///
    /// The key is read once; the vault never re-reads configuration after
    /// this point.
    pub fn key(self, key: MasterKey) -> VaultBuilder<C, WithKey> {
        VaultBuilder { _cipher: PhantomData, key: WithKey(key) }
    }
}

impl<C: VaultCipher> VaultBuilder<C, WithKey> {
    /// Finalizes vault construction.
    ///
    /// # Errors
    /// Returns [`VaultError::KeyUnavailable`] if the cipher rejects the key
    /// material.
    pub fn build(self) -> Result<Vault<C>, VaultError> {
        let key = Key::<C>::try_from(&self.key.0.as_bytes()[..]).map_err(|_| {
            VaultError::KeyUnavailable {
                message: "Cipher rejected the key material".into(),
                context: None,
            }
        })?;

        let cipher = C::new(&key);

        Ok(Vault { inner: Arc::new(VaultInner { cipher }) })
    }
}
