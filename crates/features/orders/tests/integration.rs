use odk_domain::config::AppConfig;
use odk_domain::model::{OrderDraft, OrderRecord, Upload};
use odk_mailer::MemoryTransport;
use odk_notifier::Notifier;
use odk_orders::{OrderError, OrderService};
use odk_storage::{KvStore, MemoryObjectStore, MemoryStore, ObjectStore, Records, StorageError};
use odk_vault::{MasterKey, Vault};
use std::sync::Arc;

struct Fixture {
    service: OrderService,
    kv: Arc<MemoryStore>,
    objects: Arc<MemoryObjectStore>,
    transport: Arc<MemoryTransport>,
    notifier: Notifier,
    vault: Vault,
}

fn fixture_with(transport: MemoryTransport) -> Fixture {
    let mut cfg = AppConfig::default();
    cfg.notifier.admin_email = Some("admin@example.com".to_owned());

    let kv = Arc::new(MemoryStore::new());
    let objects = Arc::new(MemoryObjectStore::new(&cfg.storage.public_url));
    let transport = Arc::new(transport);
    let vault = Vault::builder().key(MasterKey::generate()).build().unwrap();
    let notifier = Notifier::builder()
        .transport(Arc::clone(&transport) as Arc<dyn odk_mailer::MailTransport>)
        .build()
        .unwrap();

    let service = OrderService::new(
        cfg,
        Records::new(Arc::clone(&kv) as Arc<dyn KvStore>),
        Arc::clone(&objects) as Arc<dyn ObjectStore>,
        vault.clone(),
        notifier.clone(),
    );

    Fixture { service, kv, objects, transport, notifier, vault }
}

fn fixture() -> Fixture {
    fixture_with(MemoryTransport::new())
}

fn draft() -> OrderDraft {
    OrderDraft {
        username: "alice".to_owned(),
        password: "hunter2".to_owned(),
        service: "rank boost".to_owned(),
    }
}

fn upload() -> Upload {
    Upload {
        file_name: "receipt.png".to_owned(),
        content_type: "image/png".to_owned(),
        bytes: b"png bytes".to_vec(),
    }
}

async fn stored_record(fx: &Fixture, id: u64) -> OrderRecord {
    let records: Records<OrderRecord> =
        Records::new(Arc::clone(&fx.kv) as Arc<dyn KvStore>);
    records.get(id).await.unwrap().expect("record should exist")
}

#[tokio::test(start_paused = true)]
async fn create_returns_the_plaintext_once_and_stores_only_ciphertext() {
    let fx = fixture();

    let order = fx.service.create(draft(), upload()).await.unwrap();

    assert_eq!(order.id, 1);
    assert_eq!(order.username, "alice");
    assert_eq!(order.password, "hunter2");
    assert!(order.proof_url.contains("/proofs/"));

    let record = stored_record(&fx, order.id).await;
    assert_ne!(record.username.as_str(), "alice");
    assert_ne!(record.password.as_str(), "hunter2");
    assert_eq!(fx.vault.decrypt(&record.username).unwrap(), "alice");

    // Same plaintexts, but fresh nonces: no equality leaks between fields.
    assert_ne!(record.username, record.password);
}

#[tokio::test(start_paused = true)]
async fn create_dispatches_exactly_one_admin_notification() {
    let fx = fixture();

    fx.service.create(draft(), upload()).await.unwrap();

    assert_eq!(fx.transport.delivered(), 1);
    let email = &fx.transport.outbox()[0];
    assert_eq!(email.to, "admin@example.com");
    assert!(email.subject.contains("#1"));

    let stats = fx.notifier.stats();
    assert_eq!(stats.dispatched, 1);
    assert_eq!(stats.completed, 1);
}

#[tokio::test(start_paused = true)]
async fn notification_failure_never_fails_the_order() {
    let fx = fixture_with(MemoryTransport::failing());

    let order = fx.service.create(draft(), upload()).await.unwrap();
    assert_eq!(order.username, "alice");

    let stats = fx.notifier.stats();
    assert_eq!(stats.failed, 1, "Exactly one failed outcome per dispatch");

    // The order is durably there regardless.
    assert_eq!(fx.service.get(order.id).await.unwrap().username, "alice");
}

#[tokio::test(start_paused = true)]
async fn missing_admin_recipient_skips_notification_entirely() {
    let mut cfg = AppConfig::default();
    cfg.notifier.admin_email = None;

    let transport = Arc::new(MemoryTransport::new());
    let notifier = Notifier::builder()
        .transport(Arc::clone(&transport) as Arc<dyn odk_mailer::MailTransport>)
        .build()
        .unwrap();
    let service = OrderService::new(
        cfg.clone(),
        Records::new(Arc::new(MemoryStore::new()) as Arc<dyn KvStore>),
        Arc::new(MemoryObjectStore::new(&cfg.storage.public_url)) as Arc<dyn ObjectStore>,
        Vault::builder().key(MasterKey::generate()).build().unwrap(),
        notifier.clone(),
    );

    service.create(draft(), upload()).await.unwrap();
    assert_eq!(notifier.stats().dispatched, 0);
}

#[tokio::test(start_paused = true)]
async fn get_round_trips_the_credentials() {
    let fx = fixture();
    let created = fx.service.create(draft(), upload()).await.unwrap();

    let fetched = fx.service.get(created.id).await.unwrap();
    assert_eq!(fetched.username, "alice");
    assert_eq!(fetched.password, "hunter2");
    assert_eq!(fetched.service, created.service);
}

#[tokio::test]
async fn get_unknown_id_is_not_found() {
    let fx = fixture();
    assert!(matches!(fx.service.get(404).await, Err(OrderError::NotFound { .. })));
}

#[tokio::test(start_paused = true)]
async fn tampered_stored_credentials_surface_as_vault_failures() {
    let fx = fixture();
    let created = fx.service.create(draft(), upload()).await.unwrap();

    let mut record = stored_record(&fx, created.id).await;
    record.username = odk_vault::EncryptedSecret::from_sealed("AAAA".to_owned());
    let records: Records<OrderRecord> =
        Records::new(Arc::clone(&fx.kv) as Arc<dyn KvStore>);
    records.put(created.id, &record).await.unwrap();

    assert!(matches!(fx.service.get(created.id).await, Err(OrderError::Vault { .. })));
}

#[tokio::test(start_paused = true)]
async fn summaries_carry_no_credentials() {
    let fx = fixture();
    fx.service.create(draft(), upload()).await.unwrap();
    fx.service.create(draft(), upload()).await.unwrap();

    let summaries = fx.service.list().await.unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].id, 1);
    assert_eq!(summaries[1].id, 2);
    assert_eq!(summaries[0].service, "rank boost");
}

#[tokio::test(start_paused = true)]
async fn delete_removes_the_record_and_the_proof_object() {
    let fx = fixture();
    let created = fx.service.create(draft(), upload()).await.unwrap();
    let proof_key = stored_record(&fx, created.id).await.proof_key;

    fx.service.delete(created.id).await.unwrap();

    assert!(matches!(fx.service.get(created.id).await, Err(OrderError::NotFound { .. })));
    assert!(matches!(
        fx.objects.get(&proof_key).await,
        Err(StorageError::ObjectNotFound { .. })
    ));
}

#[tokio::test]
async fn invalid_drafts_are_rejected_before_any_side_effect() {
    let fx = fixture();

    let mut bad = draft();
    bad.service = "ab".to_owned();
    assert!(matches!(
        fx.service.create(bad, upload()).await,
        Err(OrderError::Validation { .. })
    ));

    assert_eq!(fx.notifier.stats().dispatched, 0);
    assert!(fx.service.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn rejected_uploads_leave_no_stored_object() {
    let fx = fixture();

    let bad_upload = Upload {
        file_name: "script.exe".to_owned(),
        content_type: String::new(),
        bytes: b"MZ".to_vec(),
    };
    assert!(matches!(
        fx.service.create(draft(), bad_upload).await,
        Err(OrderError::File { .. })
    ));

    let oversize = Upload {
        file_name: "huge.png".to_owned(),
        content_type: String::new(),
        bytes: vec![0; 3 * 1024 * 1024],
    };
    assert!(matches!(
        fx.service.create(draft(), oversize).await,
        Err(OrderError::File { .. })
    ));

    assert!(fx.service.list().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn service_field_is_sanitized_before_persistence() {
    let fx = fixture();

    let mut dirty = draft();
    dirty.service = "  Mythic Rank: <fast!>  ".to_owned();
    let order = fx.service.create(dirty, upload()).await.unwrap();

    assert_eq!(order.service, "Mythic Rank fast");
    assert_eq!(stored_record(&fx, order.id).await.service, "Mythic Rank fast");
}
