use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Custom error type for config loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

impl From<config::ConfigError> for ConfigError {
    #[inline]
    fn from(source: config::ConfigError) -> Self {
        Self::Config { source, context: None }
    }
}

/// Attaches human-readable context to a config error in flight.
pub trait ConfigErrorExt<T> {
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, ConfigError>;
}

impl<T> ConfigErrorExt<T> for Result<T, config::ConfigError> {
    #[inline]
    fn context(self, context: impl Into<Cow<'static, str>>) -> Result<T, ConfigError> {
        self.map_err(|source| ConfigError::Config { source, context: Some(context.into()) })
    }
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

/// A reusable configuration loader that combines file-based settings with
/// environment overrides.
///
/// Layered strategy:
/// 1. **Base File**: settings from a file (e.g. `orderdesk.toml`); without
///    an explicit path it defaults to `"orderdesk"` in the working
///    directory.
/// 2. **Environment Overrides**: values from variables prefixed with
///    `ODK__`, using double underscores for nesting (e.g.
///    `ODK__VAULT__KEY` maps to `vault.key`).
///
/// # Errors
/// Returns [`ConfigError`] if the file is missing, the environment
/// variables are malformed, or deserialization into `T` fails.
///
/// # Example
/// ```rust
/// use odk_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     name: String,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path =
        path.map_or_else(|| PathBuf::from("orderdesk"), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix("ODK")
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[derive(Debug, Default, serde::Deserialize, PartialEq, Eq)]
    struct TestConfig {
        name: String,
        nested: Nested,
    }

    #[derive(Debug, Default, serde::Deserialize, PartialEq, Eq)]
    struct Nested {
        value: u32,
    }

    fn write_config(dir: &Path) -> PathBuf {
        let path = dir.join("orderdesk.toml");
        std::fs::write(&path, "name = \"from-file\"\n\n[nested]\nvalue = 7\n").unwrap();
        dir.join("orderdesk")
    }

    #[test]
    #[serial]
    fn loads_values_from_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let base = write_config(tmp.path());

        let cfg: TestConfig = load_config(Some(&base)).unwrap();
        assert_eq!(cfg.name, "from-file");
        assert_eq!(cfg.nested.value, 7);
    }

    #[test]
    #[serial]
    fn environment_overrides_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let base = write_config(tmp.path());

        // Env mutation is process-global; serialized with the other env tests.
        #[allow(unsafe_code)]
        unsafe {
            std::env::set_var("ODK__NESTED__VALUE", "42")
        };
        let cfg: TestConfig = load_config(Some(&base)).unwrap();
        #[allow(unsafe_code)]
        unsafe {
            std::env::remove_var("ODK__NESTED__VALUE")
        };

        assert_eq!(cfg.nested.value, 42);
    }

    #[test]
    #[serial]
    fn missing_file_is_an_error() {
        let result: Result<TestConfig, _> = load_config(Some("does/not/exist"));
        assert!(result.is_err());
    }
}
