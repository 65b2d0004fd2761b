//! Facade crate for the OrderDesk features and shared modules.
//! Re-exports domain/kernel primitives and wires configuration into a ready
//! [`Platform`]. Keep this crate thin: it should compose other crates, not
//! implement business logic.
//!
//! ## Usage
//! ```rust
//! use odk::domain::config::AppConfig;
//! use odk::domain::model::{OrderDraft, Upload};
//! use odk_vault::MasterKey;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let mut cfg = AppConfig::default();
//! cfg.vault.key = MasterKey::generate().to_base64();
//!
//! let platform = odk::Platform::builder().config(cfg).build().await?;
//!
//! let order = platform
//!     .orders
//!     .create(
//!         OrderDraft {
//!             username: "alice".into(),
//!             password: "hunter2".into(),
//!             service: "rank boost".into(),
//!         },
//!         Upload {
//!             file_name: "receipt.png".into(),
//!             content_type: "image/png".into(),
//!             bytes: b"png bytes".to_vec(),
//!         },
//!     )
//!     .await?;
//! assert_eq!(order.id, 1);
//!
//! platform.close().await;
//! # Ok(())
//! # }
//! ```

pub use odk_domain as domain;
pub use odk_kernel as kernel;

/// Feature registry for runtime introspection.
pub mod features {
    pub use odk_files as files;
    pub use odk_orders as orders;
    pub use odk_requests as requests;

    pub const ENABLED: &[&str] = &["orders", "requests", "files"];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

use anyhow::Context;
use odk_domain::config::AppConfig;
use odk_domain::model::{OrderRecord, ServiceRequest};
use odk_files::FileProxy;
use odk_mailer::{MailTransport, MemoryTransport, RetryPolicy, Retrying};
use odk_notifier::Notifier;
use odk_orders::OrderService;
use odk_requests::RequestService;
use odk_storage::{
    FsObjectStore, FsStore, KvStore, MemoryObjectStore, MemoryStore, ObjectStore, Records,
};
use odk_vault::{MasterKey, Vault};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// How long [`Platform::close`] waits for outstanding notifications.
const CLOSE_GRACE: Duration = Duration::from_secs(10);

/// A fluent builder for configuring and initializing the [`Platform`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Default, Debug)]
pub struct PlatformBuilder {
    cfg: AppConfig,
    transport: Option<Arc<dyn MailTransport>>,
}

impl PlatformBuilder {
    /// Sets up the platform's configuration.
    pub fn config(mut self, cfg: AppConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Plugs in a real mail transport (SMTP, provider API).
    ///
    /// Without one the platform falls back to an in-memory transport, which
    /// is what development and tests want.
    pub fn transport(mut self, transport: Arc<dyn MailTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Consumes the builder and initializes the platform.
    ///
    /// # Process
    /// 1. Loads the vault key and builds the [`Vault`] (fail closed on a
    ///    missing or malformed key).
    /// 2. Connects record and object stores: disk-backed engines under
    ///    `storage.data_dir`, in-memory engines without one.
    /// 3. Wraps the transport in bounded retries and starts the notifier.
    /// 4. Wires the feature services.
    ///
    /// # Errors
    /// Returns an error when the key is rejected, a storage root cannot be
    /// prepared, or the notifier configuration is invalid.
    pub async fn build(self) -> anyhow::Result<Platform> {
        let cfg = self.cfg;

        let key = MasterKey::from_base64(&cfg.vault.key)
            .context("Critical: vault key is missing or malformed")?;
        let vault = Vault::builder().key(key).build().context("Vault initialization failed")?;

        let (orders_kv, requests_kv, objects) = init_stores(&cfg).await?;

        let transport = self.transport.unwrap_or_else(|| {
            info!("No mail transport configured; using the in-memory transport");
            Arc::new(MemoryTransport::new())
        });
        let retrying = Retrying::new(
            transport,
            RetryPolicy {
                attempts: cfg.mailer.retry_attempts,
                base_delay: cfg.mailer.retry_base(),
            },
        );

        let notifier = Notifier::builder()
            .transport(Arc::new(retrying))
            .capacity(cfg.notifier.capacity)
            .deadline(cfg.notifier.deadline())
            .build()
            .context("Notifier initialization failed")?;

        let orders = OrderService::new(
            cfg.clone(),
            Records::<OrderRecord>::new(orders_kv),
            Arc::clone(&objects),
            vault,
            notifier.clone(),
        );
        let requests = RequestService::new(
            cfg.clone(),
            Records::<ServiceRequest>::new(requests_kv),
            notifier.clone(),
        );
        let files = FileProxy::new(objects);

        info!(app = %cfg.app.name, "Platform initialized");
        Ok(Platform { orders, requests, files, notifier })
    }
}

async fn init_stores(
    cfg: &AppConfig,
) -> anyhow::Result<(Arc<dyn KvStore>, Arc<dyn KvStore>, Arc<dyn ObjectStore>)> {
    match &cfg.storage.data_dir {
        Some(data_dir) => {
            let orders = FsStore::builder(data_dir.join("orders"))
                .connect()
                .await
                .context("Failed to connect the order store")?;
            let requests = FsStore::builder(data_dir.join("requests"))
                .connect()
                .await
                .context("Failed to connect the request store")?;
            let objects = FsObjectStore::builder(data_dir.join("objects"))
                .base_url(&cfg.storage.public_url)
                .connect()
                .await
                .context("Failed to connect the object store")?;
            Ok((Arc::new(orders), Arc::new(requests), Arc::new(objects)))
        },
        None => Ok((
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryObjectStore::new(&cfg.storage.public_url)),
        )),
    }
}

/// A fully initialized platform with every feature service wired.
#[derive(Debug)]
pub struct Platform {
    pub orders: OrderService,
    pub requests: RequestService,
    pub files: FileProxy,
    notifier: Notifier,
}

impl Platform {
    /// Returns a new [`PlatformBuilder`] to configure the platform.
    pub fn builder() -> PlatformBuilder {
        PlatformBuilder::default()
    }

    /// Drains outstanding notifications and shuts the platform down.
    pub async fn close(&self) {
        self.notifier.close(CLOSE_GRACE).await;
    }

    /// The shared notifier, mainly for observability.
    #[must_use]
    pub const fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
