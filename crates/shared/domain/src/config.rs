use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Top-level application configuration shared across services.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub app: AppInfo,
    pub vault: VaultConfig,
    pub storage: StorageConfig,
    pub notifier: NotifierConfig,
    pub mailer: MailerConfig,
    pub upload: UploadConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut AppConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Application identity used in notification templates.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppInfo {
    pub name: String,
}

/// Credential vault configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Base64-encoded 256-bit key. Empty means the vault cannot start.
    pub key: String,
}

/// Storage roots and the public URL uploads are served under.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for disk-backed engines; `None` keeps everything in
    /// memory (development and tests).
    pub data_dir: Option<PathBuf>,
    /// Base URL prepended to object keys when building proof links.
    pub public_url: String,
}

/// Best-effort notifier configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Recipient of admin notifications; `None` disables them.
    pub admin_email: Option<String>,
    /// Bound on concurrently running delivery attempts.
    pub capacity: u32,
    /// Authoritative deadline for one attempt-bundle, in seconds.
    pub deadline_secs: u64,
    /// Grace window the order path waits for an early outcome, in seconds.
    pub grace_secs: u64,
}

impl NotifierConfig {
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    #[must_use]
    pub const fn grace(&self) -> Duration {
        Duration::from_secs(self.grace_secs)
    }
}

/// Mail transport configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailerConfig {
    /// Total delivery attempts, including the first one.
    pub retry_attempts: u32,
    /// Backoff before the second attempt, in seconds; doubles afterwards.
    pub retry_base_secs: u64,
    /// Display name used as the sender.
    pub from_name: String,
}

impl MailerConfig {
    #[must_use]
    pub const fn retry_base(&self) -> Duration {
        Duration::from_secs(self.retry_base_secs)
    }
}

/// Upload admission policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Largest accepted payment proof, in bytes.
    pub max_bytes: u64,
    /// Accepted file extensions, with the leading dot.
    pub allowed_extensions: Vec<String>,
}

// --- Default ---

impl Default for AppInfo {
    fn default() -> Self {
        Self { name: "OrderDesk".to_owned() }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self { key: String::new() }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: None, public_url: "http://localhost:4650/uploads".to_owned() }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self { admin_email: None, capacity: 8, deadline_secs: 30, grace_secs: 2 }
    }
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self { retry_attempts: 2, retry_base_secs: 2, from_name: "OrderDesk".to_owned() }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 2 * 1024 * 1024,
            allowed_extensions: [".jpg", ".jpeg", ".png", ".pdf"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}
