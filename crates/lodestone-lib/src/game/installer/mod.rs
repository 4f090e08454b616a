pub mod config;
pub mod core;
pub mod error;
pub mod lock;
pub mod types;

use crate::game::versions::{CleanupReport, VersionManager};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use config::EngineConfig;
use error::InstallError;
use lock::CacheLock;
use serde::{Deserialize, Serialize};
use types::CacheLayout;

/// A published version as shown to the command layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableVersion {
    pub id: String,
    pub version_type: String,
    pub release_time: Option<DateTime<Utc>>,
    pub installed: bool,
    pub latest_release: bool,
    pub latest_snapshot: bool,
}

async fn prepare_dirs(layout: &CacheLayout) -> Result<()> {
    for dir in [
        layout.versions_dir(),
        layout.libraries_dir(),
        layout.asset_indexes_dir(),
        layout.asset_objects_dir(),
    ] {
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create {:?}", dir))?;
    }
    Ok(())
}

/// Install or repair one version and its whole inheritance chain
pub async fn install(config: &EngineConfig, id: &str, force_unverified: bool) -> Result<()> {
    let layout = config.layout();
    let _lock = CacheLock::acquire(&layout)?;
    prepare_dirs(&layout).await?;

    let mut manager = VersionManager::new(config.clone())?;
    install_with(&mut manager, id, force_unverified).await
}

/// `install` against an existing manager; the caller holds the cache lock
pub async fn install_with(
    manager: &mut VersionManager,
    id: &str,
    force_unverified: bool,
) -> Result<()> {
    log::info!("Installing {} (force_unverified={})", id, force_unverified);

    match manager.version_info(id).await {
        Ok(Some(_)) => manager.mark_refresh(id),
        Ok(None) => log::warn!("{} is not a published version, using local data only", id),
        Err(e) => log::warn!("Version manifest unavailable ({:#}), using local data", e),
    }

    manager.load_version(id, true).await?;
    manager.validate_all(id, force_unverified).await?;
    log::info!("Installed {}", id);
    Ok(())
}

/// Refresh and repair every installed version
pub async fn install_all(config: &EngineConfig, force_unverified: bool) -> Result<()> {
    let layout = config.layout();
    let _lock = CacheLock::acquire(&layout)?;
    prepare_dirs(&layout).await?;

    let mut manager = VersionManager::new(config.clone())?;
    install_all_with(&mut manager, force_unverified).await
}

pub async fn install_all_with(manager: &mut VersionManager, force_unverified: bool) -> Result<()> {
    let mut failures = Vec::new();

    if let Err(e) = manager.load_all_installed(true).await {
        match e.downcast::<InstallError>() {
            Ok(InstallError::VersionsFailed { failures: f }) => failures.extend(f),
            Ok(other) => return Err(other.into()),
            Err(e) => return Err(e),
        }
    }

    if let Err(e) = manager.validate_all_loaded(force_unverified).await {
        match e.downcast::<InstallError>() {
            Ok(InstallError::VersionsFailed { failures: f }) => failures.extend(f),
            Ok(other) => return Err(other.into()),
            Err(e) => return Err(e),
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(InstallError::VersionsFailed { failures }.into())
    }
}

/// Load every installed version from disk and sweep unreferenced files
pub async fn cleanup(config: &EngineConfig) -> Result<CleanupReport> {
    let layout = config.layout();
    let _lock = CacheLock::acquire(&layout)?;

    let mut manager = VersionManager::new(config.clone())?;
    cleanup_with(&mut manager).await
}

pub async fn cleanup_with(manager: &mut VersionManager) -> Result<CleanupReport> {
    // A version that fails to load would have its files swept
    manager
        .load_all_installed(false)
        .await
        .context("Refusing to clean up while installed versions fail to load")?;
    manager.cleanup().await
}

pub async fn list_installed(config: &EngineConfig) -> Result<Vec<String>> {
    VersionManager::new(config.clone())?.list_installed().await
}

/// Published versions, newest first as listed by the manifest
pub async fn list_available(config: &EngineConfig, release_only: bool) -> Result<Vec<AvailableVersion>> {
    let manager = VersionManager::new(config.clone())?;
    list_available_with(&manager, release_only).await
}

pub async fn list_available_with(
    manager: &VersionManager,
    release_only: bool,
) -> Result<Vec<AvailableVersion>> {
    let latest = manager.latest().await?;
    let versions = manager
        .available_versions()
        .await?
        .into_iter()
        .filter(|v| !release_only || v.is_release())
        .map(|v| AvailableVersion {
            installed: manager.is_installed(&v.id),
            latest_release: v.id == latest.release,
            latest_snapshot: v.id == latest.snapshot,
            release_time: v.release_time,
            version_type: v.version_type,
            id: v.id,
        })
        .collect();
    Ok(versions)
}

/// Delete one version's own directory; shared files wait for `cleanup`
pub async fn remove(config: &EngineConfig, id: &str) -> Result<bool> {
    let layout = config.layout();
    let _lock = CacheLock::acquire(&layout)?;

    let mut manager = VersionManager::new(config.clone())?;
    manager.delete_version(id).await
}
