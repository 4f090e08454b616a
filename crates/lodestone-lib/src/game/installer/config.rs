//! Engine settings.
//! Remote endpoints default to the official distribution hosts and can be
//! overridden per `EngineConfig`, which is how tests point the engine at a
//! local server.

use super::types::CacheLayout;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// URL Constants
pub const VANILLA_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";
pub const LIBRARIES_BASE_URL: &str = "https://libraries.minecraft.net/";
pub const RESOURCES_BASE_URL: &str = "https://resources.download.minecraft.net/";

pub const DEFAULT_DOWNLOAD_CONCURRENCY: usize = 20;
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Environment variable overriding the cache root
pub const ROOT_ENV_VAR: &str = "MINECRAFT_HOME";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Root of the cache tree (`versions/`, `libraries/`, `assets/`)
    pub root_dir: PathBuf,

    /// Maximum number of transfers in flight within one batch
    pub download_concurrency: usize,

    /// Custom window size, enables the `has_custom_resolution` rule feature
    pub resolution: Option<(u32, u32)>,

    /// Enables the `is_demo_user` rule feature
    pub demo_user: bool,

    pub manifest_url: String,
    pub libraries_base_url: String,
    pub resources_base_url: String,

    pub launcher_name: String,
    pub launcher_version: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            download_concurrency: DEFAULT_DOWNLOAD_CONCURRENCY,
            resolution: None,
            demo_user: false,
            manifest_url: VANILLA_MANIFEST_URL.to_string(),
            libraries_base_url: LIBRARIES_BASE_URL.to_string(),
            resources_base_url: RESOURCES_BASE_URL.to_string(),
            launcher_name: env!("CARGO_PKG_NAME").to_string(),
            launcher_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl EngineConfig {
    /// Defaults with the cache root taken from `$MINECRAFT_HOME` or `~/.minecraft`
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Defaults rooted at an explicit directory
    pub fn with_root(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Self::default()
        }
    }

    /// Load settings from a JSON file; absent fields keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read engine config {:?}", path))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse engine config {:?}", path))?;
        Ok(config)
    }

    pub fn layout(&self) -> CacheLayout {
        CacheLayout::new(self.root_dir.clone())
    }

    /// Concurrency limit, never below one worker
    pub fn concurrency(&self) -> usize {
        self.download_concurrency.max(1)
    }
}

pub fn default_root_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(ROOT_ENV_VAR).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".minecraft")
}

pub fn request_timeout() -> std::time::Duration {
    std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn partial_config_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "rootDir": "/srv/mc", "downloadConcurrency": 4, "resolution": [854, 480] }}"#
        )
        .unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.root_dir, PathBuf::from("/srv/mc"));
        assert_eq!(config.download_concurrency, 4);
        assert_eq!(config.resolution, Some((854, 480)));
        assert_eq!(config.manifest_url, VANILLA_MANIFEST_URL);
        assert!(!config.demo_user);
    }

    #[test]
    fn concurrency_never_zero() {
        let config = EngineConfig {
            download_concurrency: 0,
            ..EngineConfig::with_root("/tmp/mc")
        };
        assert_eq!(config.concurrency(), 1);
    }
}
