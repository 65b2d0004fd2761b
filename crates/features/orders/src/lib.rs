//! Order intake feature slice.
//!
//! [`OrderService`] wires the four collaborators of the create-order flow:
//! the credential vault, the record store, the object store, and the
//! best-effort notifier. Credentials are sealed before anything touches
//! durable storage; a sealing failure aborts the operation (and cleans up
//! the just-stored proof object) rather than ever persisting a plaintext
//! secret. Notification failures, in contrast, are deliberately non-fatal:
//! the stored order is the source of truth, the email is a convenience
//! signal.

mod error;
mod notify;

pub use error::OrderError;

use chrono::Utc;
use odk_domain::config::AppConfig;
use odk_domain::model::{Order, OrderDraft, OrderRecord, OrderSummary, Upload};
use odk_kernel::validate::{FieldErrors, is_blank, sanitize};
use odk_notifier::{Notification, Notifier, Outcome};
use odk_storage::{ObjectStore, Records};
use odk_vault::Vault;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Service-type length bounds, in characters.
const SERVICE_MIN_CHARS: usize = 3;
const SERVICE_MAX_CHARS: usize = 100;

/// Order intake operations over the collaborating stores.
#[derive(Debug, Clone)]
pub struct OrderService {
    cfg: AppConfig,
    records: Records<OrderRecord>,
    objects: Arc<dyn ObjectStore>,
    vault: Vault,
    notifier: Notifier,
}

impl OrderService {
    #[must_use]
    pub fn new(
        cfg: AppConfig,
        records: Records<OrderRecord>,
        objects: Arc<dyn ObjectStore>,
        vault: Vault,
        notifier: Notifier,
    ) -> Self {
        Self { cfg, records, objects, vault, notifier }
    }

    /// Creates an order from a validated draft and its payment proof.
    ///
    /// Flow: admit and store the upload, seal both credentials, persist the
    /// record, then dispatch the admin notification and wait at most the
    /// configured grace window for an early outcome. The returned [`Order`]
    /// echoes the submitted plaintext credentials once; they are never
    /// readable from storage without the vault.
    ///
    /// # Errors
    /// * [`OrderError::Validation`] for missing or out-of-bounds fields.
    /// * [`OrderError::File`] when the upload is rejected or cannot be
    ///   stored.
    /// * [`OrderError::Vault`] when sealing fails; the stored proof object
    ///   is cleaned up first.
    /// * [`OrderError::Storage`] when persisting the record fails.
    pub async fn create(&self, draft: OrderDraft, upload: Upload) -> Result<Order, OrderError> {
        validate_draft(&draft)?;

        let admitted = odk_files::admit(&self.cfg.upload, upload)?;
        let proof_url =
            self.objects.put(&admitted.key, &admitted.bytes, &admitted.content_type).await?;

        let username = match self.vault.encrypt(&draft.username) {
            Ok(sealed) => sealed,
            Err(err) => {
                warn!(error = %err, "Failed to seal username");
                self.discard_object(&admitted.key).await;
                return Err(err.into());
            },
        };

        let password = match self.vault.encrypt(&draft.password) {
            Ok(sealed) => sealed,
            Err(err) => {
                warn!(error = %err, "Failed to seal password");
                self.discard_object(&admitted.key).await;
                return Err(err.into());
            },
        };

        let id = self.records.next_id();
        let now = Utc::now();
        let record = OrderRecord {
            id,
            username,
            password,
            service: sanitize(&draft.service),
            proof_key: admitted.key.clone(),
            proof_url: proof_url.clone(),
            created_at: now,
            updated_at: now,
        };

        if let Err(err) = self.records.put(id, &record).await {
            warn!(order = id, error = %err, "Failed to persist order");
            self.discard_object(&admitted.key).await;
            return Err(err.into());
        }

        info!(order = id, service = %record.service, "Order created");
        self.notify_admin(&record, &draft.username).await;

        Ok(Order {
            id,
            username: draft.username,
            password: draft.password,
            service: record.service,
            proof_url,
            created_at: now,
            updated_at: now,
        })
    }

    /// Fetches a single order with its credentials unsealed.
    ///
    /// # Errors
    /// * [`OrderError::NotFound`] when the id is unknown.
    /// * [`OrderError::Vault`] when unsealing fails; unreadable data is
    ///   never partially returned.
    pub async fn get(&self, id: u64) -> Result<Order, OrderError> {
        let record = self.records.get(id).await?.ok_or_else(|| not_found(id))?;

        let username = self.vault.decrypt(&record.username)?;
        let password = self.vault.decrypt(&record.password)?;

        Ok(Order {
            id: record.id,
            username,
            password,
            service: record.service,
            proof_url: record.proof_url,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Lists all orders; summaries carry no credential fields at all.
    ///
    /// # Errors
    /// Returns [`OrderError::Storage`] when the record store fails.
    pub async fn list(&self) -> Result<Vec<OrderSummary>, OrderError> {
        let records = self.records.list().await?;
        Ok(records.iter().map(OrderSummary::from).collect())
    }

    /// Deletes an order and its stored payment proof.
    ///
    /// The proof deletion is best-effort; a dangling object is logged, not
    /// surfaced.
    ///
    /// # Errors
    /// * [`OrderError::NotFound`] when the id is unknown.
    /// * [`OrderError::Storage`] when deleting the record fails.
    pub async fn delete(&self, id: u64) -> Result<(), OrderError> {
        let record = self.records.get(id).await?.ok_or_else(|| not_found(id))?;

        if !record.proof_key.is_empty() {
            self.discard_object(&record.proof_key).await;
        }

        self.records.delete(id).await?;
        info!(order = id, "Order deleted");
        Ok(())
    }

    /// Dispatches the admin notification and watches it for the grace
    /// window. Nothing here can fail the surrounding operation.
    async fn notify_admin(&self, record: &OrderRecord, username: &str) {
        let Some(admin) = self.cfg.notifier.admin_email.as_deref() else {
            debug!(order = record.id, "No admin notification recipient configured");
            return;
        };

        let email = notify::order_email(
            admin,
            &self.cfg.app.name,
            record.id,
            username,
            &record.service,
            &record.proof_url,
        );

        let dispatch = self.notifier.dispatch(Notification::new(email));
        match dispatch.grace(self.cfg.notifier.grace()).await {
            Outcome::Completed => info!(order = record.id, "Admin notification delivered"),
            Outcome::Failed => {
                warn!(order = record.id, "Order created but the notification failed");
            },
            Outcome::TimedOut => {
                warn!(order = record.id, "Order created but the notification timed out");
            },
            Outcome::InFlight => {
                info!(order = record.id, "Notification still in flight (background)");
            },
        }
    }

    async fn discard_object(&self, key: &str) {
        if let Err(err) = self.objects.delete(key).await {
            warn!(key, error = %err, "Failed to clean up stored object");
        }
    }
}

fn not_found(id: u64) -> OrderError {
    OrderError::NotFound { message: format!("No order with id {id}").into(), context: None }
}

fn validate_draft(draft: &OrderDraft) -> Result<(), OrderError> {
    let mut errors = FieldErrors::default();

    if is_blank(&draft.username) {
        errors.push("username", "is required");
    }
    if is_blank(&draft.password) {
        errors.push("password", "is required");
    }

    let service_chars = draft.service.trim().chars().count();
    if is_blank(&draft.service) {
        errors.push("service", "is required");
    } else if service_chars < SERVICE_MIN_CHARS {
        errors.push("service", "must be at least 3 characters");
    } else if service_chars > SERVICE_MAX_CHARS {
        errors.push("service", "must be at most 100 characters");
    }

    errors.into_result().map_err(|errors| OrderError::Validation {
        message: errors.to_string().into(),
        context: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(username: &str, password: &str, service: &str) -> OrderDraft {
        OrderDraft {
            username: username.to_owned(),
            password: password.to_owned(),
            service: service.to_owned(),
        }
    }

    #[test]
    fn drafts_require_every_field() {
        assert!(validate_draft(&draft("", "pw", "rank boost")).is_err());
        assert!(validate_draft(&draft("user", "", "rank boost")).is_err());
        assert!(validate_draft(&draft("user", "pw", "")).is_err());
        assert!(validate_draft(&draft("user", "pw", "rank boost")).is_ok());
    }

    #[test]
    fn service_length_is_bounded() {
        assert!(validate_draft(&draft("u", "p", "ab")).is_err());
        assert!(validate_draft(&draft("u", "p", "abc")).is_ok());
        assert!(validate_draft(&draft("u", "p", &"x".repeat(100))).is_ok());
        assert!(validate_draft(&draft("u", "p", &"x".repeat(101))).is_err());
    }
}
