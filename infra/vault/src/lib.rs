//! A thread-safe credential vault for short secrets stored at rest.
//!
//! This crate turns a plaintext secret (a username, a password) into an
//! opaque, self-contained ciphertext string that is safe to hand to any
//! storage backend, and reverses the transformation on read.
//!
//! ## Payload Format
//!
//! Sealed secrets are stored as a base64-encoded binary blob:
//!
//! ```text
//! [NONCE(12)][CIPHERTEXT(N)][TAG(16)]
//! ```
//!
//! There is no version header and no key-version tag: the process runs with
//! a single static 256-bit key for its whole lifetime, and every byte of the
//! blob is covered by the authentication tag, so any tampering or truncation
//! fails closed.
//!
//! ## Nonce Policy
//!
//! Every encryption draws a **random 96-bit nonce** from the system RNG.
//! Two calls with identical plaintext therefore produce different blobs, and
//! stored values never leak equality. Random nonces are probabilistic; for
//! extremely high-volume encryption per key, rotate keys instead.
//!
//! ## Key Handling
//!
//! The key is supplied once at process start as a base64-encoded 32-byte
//! value ([`MasterKey::from_base64`]), held only in memory, and zeroized on
//! drop. Anything that does not decode to exactly 32 bytes is rejected up
//! front, so a misconfigured process fails at startup rather than deep in a
//! request path.
//!
//! ## Example
//!
//! ```rust
//! use odk_vault::prelude::*;
//!
//! # fn main() -> Result<(), VaultError> {
//! let key = MasterKey::generate();
//! let vault = Vault::<Aes>::builder().key(key).build()?;
//!
//! let sealed = vault.encrypt("hunter2")?;
//! let plain = vault.decrypt(&sealed)?;
//! assert_eq!(plain, "hunter2");
//! # Ok(())
//! # }
//! ```

mod builder;
mod engine;
mod error;
mod key;
mod types;

pub use builder::VaultBuilder;
pub use engine::Vault;
pub use error::{VaultError, VaultErrorExt};
pub use key::MasterKey;
pub use types::{Aes, ChaCha, EncryptedSecret, VaultCipher};

pub mod prelude {
    pub use crate::builder::VaultBuilder;
    pub use crate::engine::Vault;
    pub use crate::error::{VaultError, VaultErrorExt};
    pub use crate::key::MasterKey;
    pub use crate::types::{Aes, ChaCha, EncryptedSecret};
}
