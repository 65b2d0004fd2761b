use odk::Platform;
use odk::domain::config::AppConfig;
use odk::domain::model::{OrderDraft, RequestDraft, Upload};
use odk_vault::MasterKey;

fn config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.vault.key = MasterKey::generate().to_base64();
    cfg.notifier.admin_email = Some("admin@example.com".to_owned());
    cfg
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

#[tokio::test(start_paused = true)]
async fn end_to_end_flow_on_the_memory_engines() {
    let platform = Platform::builder().config(config()).build().await.unwrap();

    let order = platform.orders.create(draft(), upload()).await.unwrap();
    assert_eq!(order.username, "alice");

    let fetched = platform.orders.get(order.id).await.unwrap();
    assert_eq!(fetched.password, "hunter2");

    let served = platform
        .files
        .serve(&format!("uploads/{}", order.proof_url.rsplit('/').next().unwrap()), false)
        .await
        .unwrap();
    assert_eq!(served.bytes, b"png bytes");

    let request = platform
        .requests
        .create(RequestDraft {
            name: "Bob".to_owned(),
            email: "bob@example.com".to_owned(),
            service: "Something custom".to_owned(),
        })
        .await
        .unwrap();
    assert_eq!(request.id, 1);

    platform.close().await;
    assert_eq!(platform.notifier().stats().completed, 2);
}

#[tokio::test(start_paused = true)]
async fn end_to_end_flow_on_the_disk_engines() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cfg = config();
    cfg.storage.data_dir = Some(tmp.path().join("data"));

    let platform = Platform::builder().config(cfg.clone()).build().await.unwrap();
    let order = platform.orders.create(draft(), upload()).await.unwrap();
    platform.close().await;

    // A fresh platform over the same data directory sees the order.
    let reopened = Platform::builder().config(cfg).build().await.unwrap();
    let fetched = reopened.orders.get(order.id).await.unwrap();
    assert_eq!(fetched.username, "alice");
    assert_eq!(reopened.orders.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn a_missing_vault_key_fails_the_build() {
    let cfg = AppConfig::default();
    assert!(Platform::builder().config(cfg).build().await.is_err());
}

#[tokio::test]
async fn a_truncated_vault_key_fails_the_build() {
    let mut cfg = AppConfig::default();
    cfg.vault.key = "c2hvcnQta2V5".to_owned();
    assert!(Platform::builder().config(cfg).build().await.is_err());
}
