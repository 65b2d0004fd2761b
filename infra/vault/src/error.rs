//! # Vault Errors
//!
//! This module defines the [`VaultError`] enum used throughout the vault
//! crate for reporting key, cryptographic, and payload failures.

use std::borrow::Cow;

/// A specialized [`VaultError`] enum for vault-related failures.
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// The encryption key is missing or malformed.
    ///
    /// Fatal to every vault operation attempted afterwards; detected when
    /// the key is loaded, not deep inside a request path.
    #[error("Encryption key unavailable{}: {message}", format_context(.context))]
    KeyUnavailable { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Failure during the encryption process.
    #[error("Encryption error{}: {message}", format_context(.context))]
    Encryption { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The sealed blob is not valid base64 or is too short to contain a
    /// nonce and an authentication tag.
    #[error("Malformed payload{}: {message}", format_context(.context))]
    MalformedPayload { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The authenticated decryption check failed.
    ///
    /// Indicates a wrong key, tampering, or corruption. Treated uniformly;
    /// no partial plaintext is ever returned.
    #[error("Authentication failed{}: {message}", format_context(.context))]
    Authentication { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal vault error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Attaches human-readable context to a vault error in flight.
pub trait VaultErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, VaultError>;
}

impl<T> VaultErrorExt<T> for Result<T, VaultError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Self {
        self.map_err(|mut e| {
            match &mut e {
                VaultError::KeyUnavailable { context: c, .. }
                | VaultError::Encryption { context: c, .. }
                | VaultError::MalformedPayload { context: c, .. }
                | VaultError::Authentication { context: c, .. }
                | VaultError::Internal { context: c, .. } => *c = Some(context.into()),
            }
            e
        })
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}
