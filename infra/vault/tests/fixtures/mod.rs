use odk_vault::prelude::*;

/// Initializes a vault with a freshly generated key for testing.
///
/// # Panics
/// * If vault setup fails, the function will panic.
#[must_use]
pub fn setup_vault() -> Vault {
    Vault::builder().key(MasterKey::generate()).build().expect("Vault setup failed")
}

/// Initializes a vault from the base64 form of an explicit key.
///
/// # Panics
/// * If the key is rejected or vault setup fails.
#[must_use]
pub fn setup_vault_with_key(encoded: &str) -> Vault {
    let key = MasterKey::from_base64(encoded).expect("Key should load");
    Vault::builder().key(key).build().expect("Vault setup failed")
}
