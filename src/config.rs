//! Configuration management for the drive explorer
//!
//! Everything here is loaded once at startup and is immutable afterwards.
//! Values come from an optional `config.toml` with environment overrides.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

const DEFAULT_PASSWORD: &str = "admin";

/// Complete server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address the HTTP listener binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port for the HTTP listener
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret required to open a session
    /// Environment: DRIVE_EXPLORER_PASSWORD
    #[serde(default = "default_password")]
    pub password: String,

    /// Maximum upload size in bytes
    /// Environment: DRIVE_EXPLORER_MAX_FILE_SIZE
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Lifetime of a login session
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Deadline for a single disk usage query
    #[serde(default = "default_usage_timeout_secs")]
    pub usage_timeout_secs: u64,

    /// Login attempts allowed per client IP per minute
    #[serde(default = "default_login_attempts_per_minute")]
    pub login_attempts_per_minute: usize,

    /// Volume id -> root directory
    /// Environment: DRIVE_EXPLORER_VOLUMES__<ID>
    #[serde(default)]
    pub volumes: BTreeMap<String, String>,

    /// Extension tables driving icons and preview eligibility
    #[serde(default)]
    pub preview: PreviewExtensions,
}

/// Extensions (without the leading dot) that browsers can render inline.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PreviewExtensions {
    #[serde(default = "default_image_extensions")]
    pub images: Vec<String>,
    #[serde(default = "default_video_extensions")]
    pub videos: Vec<String>,
    #[serde(default = "default_text_extensions")]
    pub text: Vec<String>,
    #[serde(default = "default_pdf_extensions")]
    pub pdf: Vec<String>,
}

impl Default for PreviewExtensions {
    fn default() -> Self {
        Self {
            images: default_image_extensions(),
            videos: default_video_extensions(),
            text: default_text_extensions(),
            pdf: default_pdf_extensions(),
        }
    }
}

impl PreviewExtensions {
    /// Lowercases every entry and strips a leading dot so `.JPG` and `jpg`
    /// are the same table entry.
    fn normalize(&mut self) {
        for table in [
            &mut self.images,
            &mut self.videos,
            &mut self.text,
            &mut self.pdf,
        ] {
            for ext in table.iter_mut() {
                *ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
            }
            table.retain(|ext| !ext.is_empty());
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            password: default_password(),
            max_file_size: default_max_file_size(),
            session_ttl_secs: default_session_ttl_secs(),
            usage_timeout_secs: default_usage_timeout_secs(),
            login_attempts_per_minute: default_login_attempts_per_minute(),
            volumes: BTreeMap::new(),
            preview: PreviewExtensions::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        // Packaged layout first, then the working directory
        let config_paths = ["drive-explorer/config", "config"];

        let mut builder = Config::builder();
        for config_path in config_paths {
            builder = builder.add_source(File::with_name(config_path).required(false));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("DRIVE_EXPLORER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.finish()
    }

    /// Normalizes and validates a configuration built by hand or by `load`.
    pub fn finish(mut self) -> Result<Self, config::ConfigError> {
        self.preview.normalize();
        self.validate()?;
        Ok(self)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.port == 0 {
            return Err(config::ConfigError::Message("port cannot be 0".into()));
        }

        if self.password.is_empty() {
            return Err(config::ConfigError::Message(
                "password cannot be empty".into(),
            ));
        }

        if self.volumes.is_empty() {
            return Err(config::ConfigError::Message(
                "at least one volume must be configured".into(),
            ));
        }

        if let Some((id, _)) = self
            .volumes
            .iter()
            .find(|(id, root)| id.trim().is_empty() || root.trim().is_empty())
        {
            return Err(config::ConfigError::Message(format!(
                "volume '{id}' has an empty id or root"
            )));
        }

        if self.max_file_size == 0 {
            return Err(config::ConfigError::Message(
                "max_file_size must be greater than 0".into(),
            ));
        }

        if self.usage_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "usage_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.session_ttl_secs == 0 {
            return Err(config::ConfigError::Message(
                "session_ttl_secs must be greater than 0".into(),
            ));
        }

        if self.login_attempts_per_minute == 0 {
            return Err(config::ConfigError::Message(
                "login_attempts_per_minute must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get bind address and port as socket address
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Whether the shared secret was never changed from the shipped default
    pub fn uses_default_password(&self) -> bool {
        self.password == DEFAULT_PASSWORD
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn usage_timeout(&self) -> Duration {
        Duration::from_secs(self.usage_timeout_secs)
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    1234
}

fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}

fn default_max_file_size() -> u64 {
    5 * 1024 * 1024 * 1024
}

fn default_session_ttl_secs() -> u64 {
    12 * 60 * 60
}

fn default_usage_timeout_secs() -> u64 {
    5
}

fn default_login_attempts_per_minute() -> usize {
    10
}

fn to_strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn default_image_extensions() -> Vec<String> {
    to_strings(&["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"])
}

fn default_video_extensions() -> Vec<String> {
    to_strings(&["mp4", "webm", "ogg", "mov", "avi", "mkv"])
}

fn default_text_extensions() -> Vec<String> {
    to_strings(&[
        "txt", "md", "log", "csv", "json", "xml", "html", "py", "js", "sh", "conf",
    ])
}

fn default_pdf_extensions() -> Vec<String> {
    to_strings(&["pdf"])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_volume() -> ServerConfig {
        let mut config = ServerConfig::default();
        config
            .volumes
            .insert("storage_1".into(), "/mnt/storage_1".into());
        config
    }

    #[test]
    fn test_finish_accepts_minimal_config() {
        let config = with_volume().finish().unwrap();
        assert_eq!(config.port, 1234);
        assert_eq!(config.max_file_size, 5_368_709_120);
        assert!(config.uses_default_password());
    }

    #[test]
    fn test_finish_rejects_missing_volumes() {
        assert!(ServerConfig::default().finish().is_err());
    }

    #[test]
    fn test_finish_rejects_zero_limits() {
        let mut config = with_volume();
        config.max_file_size = 0;
        assert!(config.finish().is_err());

        let mut config = with_volume();
        config.port = 0;
        assert!(config.finish().is_err());
    }

    #[test]
    fn test_preview_tables_are_normalized() {
        let mut config = with_volume();
        config.preview.images = vec![".JPG".into(), " Png ".into(), ".".into()];
        let config = config.finish().unwrap();
        assert_eq!(config.preview.images, vec!["jpg", "png"]);
    }
}
