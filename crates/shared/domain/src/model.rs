use chrono::{DateTime, Utc};
use odk_vault::EncryptedSecret;
use serde::{Deserialize, Serialize};

/// An order as persisted: credentials only ever appear in sealed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: u64,
    pub username: EncryptedSecret,
    pub password: EncryptedSecret,
    pub service: String,
    pub proof_key: String,
    pub proof_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parsed order submission, as the transport layer hands it over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub username: String,
    pub password: String,
    pub service: String,
}

/// An uploaded file accompanying a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    /// Declared by the client; may be empty, in which case it is inferred
    /// from the extension.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Detail read model: credentials decrypted for the requesting owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: u64,
    pub username: String,
    pub password: String,
    pub service: String,
    pub proof_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List read model: deliberately carries no credential fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub id: u64,
    pub service: String,
    pub proof_url: String,
}

impl From<&OrderRecord> for OrderSummary {
    fn from(record: &OrderRecord) -> Self {
        Self {
            id: record.id,
            service: record.service.clone(),
            proof_url: record.proof_url.clone(),
        }
    }
}

/// A free-form custom service request as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub service: String,
    pub created_at: DateTime<Utc>,
}

/// Parsed custom service request submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDraft {
    pub name: String,
    pub email: String,
    pub service: String,
}
