use odk_domain::config::AppConfig;
use std::time::Duration;

#[test]
fn defaults_are_safe_for_development() {
    let cfg = AppConfig::default();

    assert_eq!(cfg.app.name, "OrderDesk");
    assert!(cfg.vault.key.is_empty(), "No key ships by default; the vault must fail closed");
    assert!(cfg.storage.data_dir.is_none(), "Default storage is in-memory");
    assert!(cfg.notifier.admin_email.is_none());

    assert_eq!(cfg.notifier.grace(), Duration::from_secs(2));
    assert_eq!(cfg.notifier.deadline(), Duration::from_secs(30));
    assert!(cfg.notifier.grace() < cfg.notifier.deadline());

    assert_eq!(cfg.upload.max_bytes, 2 * 1024 * 1024);
    assert!(cfg.upload.allowed_extensions.contains(&".pdf".to_owned()));
}

#[test]
fn config_clones_share_the_inner_tree() {
    let cfg = AppConfig::default();
    let clone = cfg.clone();
    assert_eq!(cfg.app.name, clone.app.name);
}

#[test]
fn deserializes_from_partial_toml() {
    let cfg: AppConfig = toml::from_str(
        "[notifier]\nadmin_email = \"admin@example.com\"\ngrace_secs = 1\n",
    )
    .unwrap();

    assert_eq!(cfg.notifier.admin_email.as_deref(), Some("admin@example.com"));
    assert_eq!(cfg.notifier.grace(), Duration::from_secs(1));
    // Untouched sections keep their defaults.
    assert_eq!(cfg.notifier.capacity, 8);
    assert_eq!(cfg.app.name, "OrderDesk");
}
