use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PfeConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub progress: ProgressConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Generation can take minutes: every section goes through an LLM.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_preview_route")]
    pub preview_route: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_step")]
    pub step: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides the default storage file location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Where PDFs are saved. Defaults to the user's download directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}
fn default_timeout() -> u64 {
    600
}
fn default_preview_route() -> String {
    "/preview".to_string()
}
fn default_interval_ms() -> u64 {
    50
}
fn default_step() -> u8 {
    1
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            preview_route: default_preview_route(),
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            step: default_step(),
        }
    }
}

impl ServerConfig {
    /// Absolute URL of the preview page.
    pub fn preview_url(&self) -> String {
        join_url(&self.base_url, &self.preview_route)
    }
}

impl DownloadConfig {
    pub fn resolve_directory(&self) -> PathBuf {
        self.directory
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Join a base URL and a route, tolerating slashes on either side. Absolute
/// routes (with a scheme) are returned unchanged.
pub fn join_url(base: &str, route: &str) -> String {
    if route.starts_with("http://") || route.starts_with("https://") {
        return route.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        route.trim_start_matches('/')
    )
}

impl PfeConfig {
    /// Load config from ~/.config/pfegen/config.toml, creating defaults if missing.
    pub fn load() -> crate::error::Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(|e| {
                crate::error::PfeError::Config(format!("Failed to read config: {e}"))
            })?;
            Self::from_toml(&contents)
        } else {
            let config = PfeConfig::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn from_toml(contents: &str) -> crate::error::Result<Self> {
        toml::from_str(contents).map_err(|e| {
            crate::error::PfeError::Config(format!("Failed to parse config: {e}"))
        })
    }

    /// Save config to disk.
    pub fn save(&self) -> crate::error::Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| {
            crate::error::PfeError::Config(format!("Failed to serialize config: {e}"))
        })?;
        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// Get the config file path.
    pub fn config_path() -> crate::error::Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            crate::error::PfeError::Config("Could not determine config directory".into())
        })?;
        Ok(config_dir.join("pfegen").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = PfeConfig::from_toml("").unwrap();
        assert_eq!(config.server.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.server.preview_route, "/preview");
        assert_eq!(config.progress.interval_ms, 50);
        assert_eq!(config.progress.step, 1);
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = PfeConfig::from_toml(
            r#"
            [server]
            base_url = "https://pfe.example.org/"

            [progress]
            step = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.server.base_url, "https://pfe.example.org/");
        assert_eq!(config.server.timeout_seconds, 600);
        assert_eq!(config.progress.step, 4);
        assert_eq!(config.progress.interval_ms, 50);
        assert_eq!(config.server.preview_url(), "https://pfe.example.org/preview");
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = PfeConfig::from_toml("[server\nbase_url = 1").unwrap_err();
        assert!(matches!(err, crate::error::PfeError::Config(_)));
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let text = toml::to_string_pretty(&PfeConfig::default()).unwrap();
        let parsed = PfeConfig::from_toml(&text).unwrap();
        assert_eq!(parsed.server.base_url, PfeConfig::default().server.base_url);
    }

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(join_url("http://h:5000/", "/generate"), "http://h:5000/generate");
        assert_eq!(join_url("http://h:5000", "generate"), "http://h:5000/generate");
        assert_eq!(
            join_url("http://h:5000", "https://cdn.example/x.pdf"),
            "https://cdn.example/x.pdf"
        );
    }
}
