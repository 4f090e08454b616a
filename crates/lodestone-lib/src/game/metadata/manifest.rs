use super::types::{LatestVersions, VersionInfo, VersionManifest};
use crate::game::installer::core::downloader::download_json_with_client;
use crate::game::installer::error::InstallError;
use anyhow::{Context, Result};
use reqwest::Client;
use tokio::sync::OnceCell;

/// Fetch-once client for the remote version manifest.
/// The first successful fetch is kept for the lifetime of the client; a
/// failed fetch is not cached.
pub struct ManifestClient {
    url: String,
    client: Client,
    cache: OnceCell<VersionManifest>,
}

impl ManifestClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client,
            cache: OnceCell::new(),
        }
    }

    /// Client with an already known manifest, no network involved
    pub fn with_manifest(client: Client, manifest: VersionManifest) -> Self {
        Self {
            url: String::new(),
            client,
            cache: OnceCell::new_with(Some(manifest)),
        }
    }

    pub async fn manifest(&self) -> Result<&VersionManifest> {
        self.cache
            .get_or_try_init(|| async {
                log::info!("Fetching version manifest from {}", self.url);
                let manifest: VersionManifest =
                    download_json_with_client(&self.client, &self.url, "version manifest")
                        .await
                        .context("Failed to fetch version manifest")?;
                log::debug!("Manifest lists {} versions", manifest.versions.len());
                Ok::<_, anyhow::Error>(manifest)
            })
            .await
    }

    /// Manifest entry for `id`, `None` when the id is not published
    pub async fn version_info(&self, id: &str) -> Result<Option<VersionInfo>> {
        Ok(self.manifest().await?.find(id).cloned())
    }

    /// Manifest entry for `id`, failing with `NotFoundInManifest`
    pub async fn find(&self, id: &str) -> Result<VersionInfo> {
        self.version_info(id)
            .await?
            .ok_or_else(|| InstallError::NotFoundInManifest { id: id.to_string() }.into())
    }

    pub async fn available(&self) -> Result<Vec<VersionInfo>> {
        Ok(self.manifest().await?.versions.clone())
    }

    pub async fn latest(&self) -> Result<LatestVersions> {
        Ok(self.manifest().await?.latest.clone())
    }
}
