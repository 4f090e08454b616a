//! Mark-and-sweep reclamation of shared cache files.

use super::manager::VersionManager;
use crate::game::installer::core::inventory::{list_files, remove_empty_dirs};
use crate::game::launcher::classpath::declared_artifact_paths;
use crate::game::launcher::version_parser::read_asset_index;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// What a cleanup pass removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub removed_files: Vec<PathBuf>,
    pub removed_dirs: usize,
    pub freed_bytes: u64,
}

/// Files reachable from the loaded versions
#[derive(Debug, Default)]
struct ReferencedSet {
    libraries: HashSet<PathBuf>,
    asset_indexes: HashSet<String>,
    asset_hashes: HashSet<String>,
}

impl VersionManager {
    /// Delete every library, asset object and asset index no loaded version
    /// references, then prune empty directories.
    ///
    /// Only loaded versions count as references; load every installed
    /// version first for a full cleanup.
    pub async fn cleanup(&self) -> Result<CleanupReport> {
        let loaded = self.loaded_ids();
        if loaded.is_empty() {
            log::warn!("Cleanup with no loaded versions removes every shared file");
        }

        let referenced = self.referenced_set(&loaded).await?;
        log::info!(
            "Cleanup: {} versions reference {} libraries, {} asset indexes, {} asset objects",
            loaded.len(),
            referenced.libraries.len(),
            referenced.asset_indexes.len(),
            referenced.asset_hashes.len()
        );

        let layout = self.layout().clone();
        let mut report = CleanupReport::default();

        for file in inventory(layout.libraries_dir()).await? {
            if !referenced.libraries.contains(&file) {
                remove_file(&file, &mut report).await?;
            }
        }

        for file in inventory(layout.asset_objects_dir()).await? {
            if !name_in(&file, &referenced.asset_hashes) {
                remove_file(&file, &mut report).await?;
            }
        }

        for file in inventory(layout.asset_indexes_dir()).await? {
            let referenced_index = file
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| referenced.asset_indexes.contains(s))
                .unwrap_or(false)
                && file.extension().and_then(|e| e.to_str()) == Some("json");
            if !referenced_index {
                remove_file(&file, &mut report).await?;
            }
        }

        let roots = [layout.libraries_dir(), layout.assets_dir()];
        report.removed_dirs = tokio::task::spawn_blocking(move || -> Result<usize> {
            let mut removed = 0;
            for root in &roots {
                removed += remove_empty_dirs(root)?;
            }
            Ok(removed)
        })
        .await??;

        log::info!(
            "Cleanup removed {} files ({} bytes) and {} empty directories",
            report.removed_files.len(),
            report.freed_bytes,
            report.removed_dirs
        );
        Ok(report)
    }

    /// Union of every loaded chain's libraries, asset indexes and objects.
    ///
    /// Library paths are taken from the descriptors without rule filtering.
    /// An asset index present on disk but unreadable aborts the pass.
    async fn referenced_set(&self, loaded: &[String]) -> Result<ReferencedSet> {
        let libraries_dir = self.layout().libraries_dir();
        let mut set = ReferencedSet::default();

        for id in loaded {
            for descriptor in self.chain(id)? {
                for lib in &descriptor.libraries {
                    for path in declared_artifact_paths(lib) {
                        set.libraries.insert(libraries_dir.join(path));
                    }
                }
                if let Some(ref index) = descriptor.asset_index {
                    set.asset_indexes.insert(index.id.clone());
                }
                if let Some(ref assets) = descriptor.assets {
                    set.asset_indexes.insert(assets.clone());
                }
            }
            set.asset_indexes.insert(self.asset_index_id(id)?);
        }

        for index_id in &set.asset_indexes {
            let path = self.layout().asset_index_path(index_id);
            if !path.exists() {
                continue;
            }
            let index = read_asset_index(&path)
                .await
                .with_context(|| format!("Refusing to clean up: asset index {} is unreadable", index_id))?;
            set.asset_hashes
                .extend(index.objects.into_values().map(|o| o.hash));
        }

        Ok(set)
    }
}

async fn inventory(root: PathBuf) -> Result<Vec<PathBuf>> {
    tokio::task::spawn_blocking(move || list_files(&root)).await?
}

fn name_in(file: &Path, names: &HashSet<String>) -> bool {
    file.file_name()
        .and_then(|n| n.to_str())
        .map(|n| names.contains(n))
        .unwrap_or(false)
}

async fn remove_file(path: &Path, report: &mut CleanupReport) -> Result<()> {
    let size = tokio::fs::metadata(path).await.map(|m| m.len()).unwrap_or(0);
    tokio::fs::remove_file(path)
        .await
        .with_context(|| format!("Failed to remove {:?}", path))?;
    log::debug!("Removed unreferenced file {:?}", path);
    report.freed_bytes += size;
    report.removed_files.push(path.to_path_buf());
    Ok(())
}
