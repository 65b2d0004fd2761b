//! Custom service request feature slice.
//!
//! Customers who want something outside the listed services submit a
//! free-form request (name, contact email, description). The record is the
//! durable artifact; the admin notification is dispatched fully detached,
//! with no grace wait at all, and its outcome is visible only in logs and
//! counters.

mod error;

pub use error::RequestError;

use chrono::Utc;
use odk_domain::config::AppConfig;
use odk_domain::model::{RequestDraft, ServiceRequest};
use odk_kernel::validate::{FieldErrors, is_blank, is_valid_email, sanitize};
use odk_mailer::Email;
use odk_notifier::{Notification, Notifier};
use odk_storage::{Records, StorageError};
use tracing::{debug, info};

/// Custom service request operations over the record store.
#[derive(Debug, Clone)]
pub struct RequestService {
    cfg: AppConfig,
    records: Records<ServiceRequest>,
    notifier: Notifier,
}

impl RequestService {
    #[must_use]
    pub fn new(cfg: AppConfig, records: Records<ServiceRequest>, notifier: Notifier) -> Self {
        Self { cfg, records, notifier }
    }

    /// Validates, sanitizes, and persists a request, then fires the admin
    /// notification without waiting for it.
    ///
    /// # Errors
    /// * [`RequestError::Validation`] for missing fields or a malformed
    ///   email address.
    /// * [`RequestError::Storage`] when persisting fails.
    pub async fn create(&self, draft: RequestDraft) -> Result<ServiceRequest, RequestError> {
        validate_draft(&draft)?;

        let id = self.records.next_id();
        let record = ServiceRequest {
            id,
            name: sanitize(&draft.name),
            email: draft.email.trim().to_owned(),
            service: sanitize(&draft.service),
            created_at: Utc::now(),
        };

        self.records.put(id, &record).await?;
        info!(request = id, "Custom service request submitted");

        self.notify_admin(&record);
        Ok(record)
    }

    /// Deletes a request; deleting an already-gone id is a no-op.
    ///
    /// # Errors
    /// Returns [`RequestError::Storage`] when the record store fails for
    /// reasons other than a missing record.
    pub async fn delete(&self, id: u64) -> Result<(), RequestError> {
        match self.records.delete(id).await {
            Ok(()) | Err(StorageError::RecordNotFound { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn notify_admin(&self, record: &ServiceRequest) {
        let Some(admin) = self.cfg.notifier.admin_email.as_deref() else {
            debug!(request = record.id, "No admin notification recipient configured");
            return;
        };

        let subject = format!("Custom service request #{}", record.id);
        let text = format!(
            "A customer asked for a service outside the catalog.\n\n\
             Request: #{}\n\
             Name:    {}\n\
             Email:   {}\n\
             Service: {}\n\n\
             {}",
            record.id, record.name, record.email, record.service, self.cfg.app.name
        );

        let email = Email::new(admin, subject).text(text);
        self.notifier.dispatch_detached(Notification::new(email));
    }
}

fn validate_draft(draft: &RequestDraft) -> Result<(), RequestError> {
    let mut errors = FieldErrors::default();

    if is_blank(&draft.name) {
        errors.push("name", "is required");
    }
    if is_blank(&draft.email) {
        errors.push("email", "is required");
    } else if !is_valid_email(draft.email.trim()) {
        errors.push("email", "must be a valid email");
    }
    if is_blank(&draft.service) {
        errors.push("service", "is required");
    }

    errors.into_result().map_err(|errors| RequestError::Validation {
        message: errors.to_string().into(),
        context: None,
    })
}
