//! # Settings
//!
//! Layered configuration, later sources win:
//! built-in defaults → `config/default.toml` → `config/local.toml` →
//! `REELSHELF__SECTION__KEY` environment variables → `DATABASE_URL`,
//! `JWT_SECRET` and `PORT`.

use std::path::PathBuf;
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

/// Shortest accepted HMAC secret, in bytes.
pub const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub media: MediaSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    /// Unset means the process runs on the in-memory store.
    pub url: Option<SecretString>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    pub token_ttl_days: i64,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    pub upload_dir: PathBuf,
    pub url_prefix: String,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// An `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    Config::builder()
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3001_i64)?
        .set_default("server.cors_origins", Vec::<String>::new())?
        .set_default("database.max_connections", 10_i64)?
        .set_default("database.acquire_timeout_secs", 5_i64)?
        .set_default("database.idle_timeout_secs", 600_i64)?
        .set_default("auth.token_ttl_days", 365_i64)?
        .set_default("auth.argon2_memory_kib", 19_456_i64)?
        .set_default("auth.argon2_iterations", 2_i64)?
        .set_default("auth.argon2_parallelism", 1_i64)?
        .set_default("media.upload_dir", "./data/uploads")?
        .set_default("media.url_prefix", "/uploads")?
        .set_default("media.max_upload_bytes", 5_i64 * 1024 * 1024)?
        .set_default("log.level", "info")?
        .set_default("log.format", "pretty")
}

impl Settings {
    /// Reads `.env`, the config files under `config/` and the environment.
    pub fn load() -> Result<Self, SettingsError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(err) if err.not_found() => {}
            Err(err) => return Err(SettingsError::Invalid(format!(".env: {err}"))),
        }

        let settings: Settings = defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("REELSHELF")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            )
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .set_override_option("auth.jwt_secret", std::env::var("JWT_SECRET").ok())?
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Defaults overlaid with one TOML document. No files or environment.
    pub fn from_toml(source: &str) -> Result<Self, SettingsError> {
        let settings: Settings = defaults()?
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.auth.jwt_secret.expose_secret().len() < MIN_JWT_SECRET_LEN {
            return Err(SettingsError::Invalid(format!(
                "auth.jwt_secret must be at least {MIN_JWT_SECRET_LEN} bytes"
            )));
        }
        if self.auth.token_ttl_days <= 0 {
            return Err(SettingsError::Invalid("auth.token_ttl_days must be positive".into()));
        }
        if self.server.port == 0 {
            return Err(SettingsError::Invalid("server.port must not be 0".into()));
        }
        if self.media.upload_dir.as_os_str().is_empty() {
            return Err(SettingsError::Invalid("media.upload_dir must not be empty".into()));
        }
        let prefix = self.media.url_prefix.as_str();
        if !prefix.starts_with('/') || prefix.trim_end_matches('/').is_empty() {
            return Err(SettingsError::Invalid(
                "media.url_prefix must start with '/' and name a path below the root".into(),
            ));
        }
        if self.media.max_upload_bytes == 0 {
            return Err(SettingsError::Invalid("media.max_upload_bytes must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = r#"
        [auth]
        jwt_secret = "0123456789abcdef0123456789abcdef"
    "#;

    #[test]
    fn defaults_fill_everything_but_the_secret() {
        let settings = Settings::from_toml(SECRET).unwrap();
        assert_eq!(settings.server.bind_addr(), "0.0.0.0:3001");
        assert!(settings.server.cors_origins.is_empty());
        assert!(settings.database.url.is_none());
        assert_eq!(settings.database.acquire_timeout(), Duration::from_secs(5));
        assert_eq!(settings.auth.token_ttl_days, 365);
        assert_eq!(settings.auth.argon2_memory_kib, 19_456);
        assert_eq!(settings.media.url_prefix, "/uploads");
        assert_eq!(settings.media.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(settings.log.format, LogFormat::Pretty);
    }

    #[test]
    fn missing_secret_fails_to_load() {
        assert!(matches!(Settings::from_toml(""), Err(SettingsError::Load(_))));
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = Settings::from_toml("[auth]\njwt_secret = \"short\"").unwrap_err();
        assert!(matches!(err, SettingsError::Invalid(_)));
    }

    #[test]
    fn upload_prefix_must_be_a_rooted_subpath() {
        for prefix in ["uploads", "/", ""] {
            let source = format!("{SECRET}\n[media]\nurl_prefix = \"{prefix}\"\n");
            let err = Settings::from_toml(&source).unwrap_err();
            assert!(matches!(err, SettingsError::Invalid(_)), "accepted {prefix:?}");
        }
    }

    #[test]
    fn file_values_override_defaults() {
        let source = format!(
            "{SECRET}\n[server]\nport = 8080\ncors_origins = [\"https://reelshelf.app\"]\n\
             [database]\nurl = \"postgres://localhost/reelshelf\"\n[log]\nformat = \"json\"\n"
        );
        let settings = Settings::from_toml(&source).unwrap();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.cors_origins, vec!["https://reelshelf.app"]);
        assert_eq!(
            settings.database.url.as_ref().map(|url| url.expose_secret().to_owned()),
            Some("postgres://localhost/reelshelf".to_owned())
        );
        assert_eq!(settings.log.format, LogFormat::Json);
    }
}
