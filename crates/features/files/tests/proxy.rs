use odk_files::{FileError, FileKind, FileProxy};
use odk_storage::{MemoryObjectStore, ObjectStore};
use std::sync::Arc;

const BASE_URL: &str = "http://localhost:4650/uploads";

async fn proxy_with_object(key: &str, bytes: &[u8], content_type: &str) -> FileProxy {
    let objects = Arc::new(MemoryObjectStore::new(BASE_URL));
    objects.put(key, bytes, content_type).await.unwrap();
    FileProxy::new(objects)
}

#[tokio::test]
async fn serves_stored_files_inline_by_default() {
    let proxy = proxy_with_object("proofs/receipt.png", b"png bytes", "image/png").await;

    let served = proxy.serve("uploads/proofs/receipt.png", false).await.unwrap();

    assert_eq!(served.bytes, b"png bytes");
    assert_eq!(served.content_type, "image/png");
    assert_eq!(served.disposition, "inline; filename=\"receipt.png\"");
}

#[tokio::test]
async fn download_mode_switches_to_attachment() {
    let proxy = proxy_with_object("proofs/receipt.pdf", b"%PDF-", "application/pdf").await;

    let served = proxy.serve("uploads/proofs/receipt.pdf", true).await.unwrap();
    assert_eq!(served.disposition, "attachment; filename=\"receipt.pdf\"");
    assert_eq!(served.content_type, "application/pdf");
}

#[tokio::test]
async fn bare_upload_paths_resolve_into_the_proof_directory() {
    let proxy = proxy_with_object("proofs/receipt.png", b"png bytes", "image/png").await;

    let served = proxy.serve("uploads/receipt.png", false).await.unwrap();
    assert_eq!(served.bytes, b"png bytes");
}

#[tokio::test]
async fn unknown_extensions_fall_back_to_octet_stream() {
    let proxy = proxy_with_object("proofs/blob.bin", b"???", "application/x-custom").await;

    let served = proxy.serve("uploads/proofs/blob.bin", false).await.unwrap();
    assert_eq!(served.content_type, "application/octet-stream");
}

#[tokio::test]
async fn missing_files_are_not_found() {
    let proxy = FileProxy::new(Arc::new(MemoryObjectStore::new(BASE_URL)));

    assert!(matches!(
        proxy.serve("uploads/proofs/absent.png", false).await,
        Err(FileError::NotFound { .. })
    ));
}

#[tokio::test]
async fn traversal_and_foreign_paths_never_reach_storage() {
    let proxy = proxy_with_object("proofs/receipt.png", b"png bytes", "image/png").await;

    for path in ["uploads/../proofs/receipt.png", "private/receipt.png", "uploads/.."] {
        assert!(
            matches!(proxy.serve(path, false).await, Err(FileError::Forbidden { .. })),
            "{path} should be forbidden"
        );
    }
}

#[tokio::test]
async fn info_classifies_files_and_builds_urls() {
    let proxy = proxy_with_object("proofs/receipt.png", b"png bytes", "image/png").await;

    let info = proxy.info("uploads/proofs/receipt.png").await.unwrap();

    assert_eq!(info.name, "receipt.png");
    assert_eq!(info.size, 9);
    assert_eq!(info.kind, FileKind::Image);
    assert_eq!(info.kind.as_str(), "image");
    assert_eq!(info.extension, ".png");
    assert_eq!(info.path, "uploads/proofs/receipt.png");
    assert_eq!(info.url, format!("{BASE_URL}/proofs/receipt.png"));
}

#[tokio::test]
async fn info_classifies_documents() {
    let proxy = proxy_with_object("proofs/receipt.pdf", b"%PDF-", "application/pdf").await;

    let info = proxy.info("uploads/proofs/receipt.pdf").await.unwrap();
    assert_eq!(info.kind, FileKind::Document);
}
