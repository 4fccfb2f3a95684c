//! # configs
//!
//! Runtime settings, layered lowest to highest:
//!
//! 1. built-in defaults
//! 2. `config/qult.toml` (optional)
//! 3. `QULT__`-prefixed environment variables, after `.env` is loaded
//!
//! Nested keys use a double underscore: `QULT__STORAGE__DATA_DIR=/var/lib/qult`.

use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_FILE: &str = "config/qult";
const ENV_PREFIX: &str = "QULT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Nothing survives a restart
    Memory,
    /// One JSON document per collection under `data_dir`
    File,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    /// Server-side secret mixed into every password hash
    #[serde(default)]
    pub pepper: Option<SecretString>,
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EconomySettings {
    /// Kopeki granted on registration
    pub starting_balance: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive, e.g. `info,services=debug`
    pub filter: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub storage: StorageSettings,
    pub auth: AuthSettings,
    pub economy: EconomySettings,
    /// Seed the demo dataset into an empty store
    pub seed_demo_data: bool,
    pub log: LogSettings,
}

impl Settings {
    /// Loads `.env`, the optional settings file, and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(invalid(".env", e.to_string())),
        }
        let builder = defaults()?
            .add_source(File::with_name(DEFAULT_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        Self::build(builder)
    }

    /// Defaults overlaid with a TOML document. No file or environment lookups.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Self::build(defaults()?.add_source(File::from_str(toml, FileFormat::Toml)))
    }

    fn build(builder: ConfigBuilder<config::builder::DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::File && self.storage.data_dir.as_os_str().is_empty() {
            return Err(invalid("storage.data_dir", "required for the file backend"));
        }
        if self.auth.iterations == 0 {
            return Err(invalid("auth.iterations", "must be at least 1"));
        }
        if self.auth.parallelism == 0 {
            return Err(invalid("auth.parallelism", "must be at least 1"));
        }
        // argon2 needs 8 KiB of memory per lane.
        if self.auth.memory_kib < 8 * self.auth.parallelism {
            return Err(invalid(
                "auth.memory_kib",
                format!("must be at least {} for {} lanes", 8 * self.auth.parallelism, self.auth.parallelism),
            ));
        }
        if self.log.filter.trim().is_empty() {
            return Err(invalid("log.filter", "cannot be empty"));
        }
        Ok(())
    }
}

fn defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError> {
    Ok(Config::builder()
        .set_default("storage.backend", "file")?
        .set_default("storage.data_dir", "./data")?
        .set_default("auth.memory_kib", 19_456)?
        .set_default("auth.iterations", 2)?
        .set_default("auth.parallelism", 1)?
        .set_default("economy.starting_balance", 1000)?
        .set_default("seed_demo_data", true)?
        .set_default("log.filter", "info")?
        .set_default("log.format", "pretty")?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults_are_usable() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.storage.backend, StorageBackend::File);
        assert_eq!(settings.storage.data_dir, PathBuf::from("./data"));
        assert_eq!(settings.economy.starting_balance, 1000);
        assert!(settings.seed_demo_data);
        assert!(settings.auth.pepper.is_none());
        assert_eq!(settings.log.format, LogFormat::Pretty);
    }

    #[test]
    fn toml_overrides_defaults() {
        let settings = Settings::from_toml(
            r#"
            seed_demo_data = false

            [storage]
            backend = "memory"

            [auth]
            pepper = "s3cret"
            memory_kib = 64

            [log]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert!(!settings.seed_demo_data);
        assert_eq!(settings.auth.memory_kib, 64);
        assert_eq!(settings.auth.pepper.as_ref().unwrap().expose_secret(), "s3cret");
        assert_eq!(settings.log.format, LogFormat::Json);
    }

    #[test]
    fn pepper_is_redacted_in_debug_output() {
        let settings = Settings::from_toml("[auth]\npepper = \"s3cret\"").unwrap();
        assert!(!format!("{settings:?}").contains("s3cret"));
    }

    #[test]
    fn too_little_argon_memory_is_rejected() {
        let err = Settings::from_toml("[auth]\nmemory_kib = 8\nparallelism = 2").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "auth.memory_kib", .. }));
    }

    #[test]
    fn unknown_backend_fails_to_load() {
        let err = Settings::from_toml("[storage]\nbackend = \"postgres\"").unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
