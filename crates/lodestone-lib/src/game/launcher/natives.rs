/// Native library extraction
use crate::game::launcher::classpath::ResolvedArtifact;
use anyhow::{Context, Result};
use std::path::Path;

/// Extract every native artifact into `dest`.
///
/// `artifacts` is the rule-filtered set of a version chain; non-native entries
/// are ignored. Archives are read on the blocking pool.
pub async fn extract_natives(
    artifacts: &[ResolvedArtifact],
    libraries_dir: &Path,
    dest: &Path,
) -> Result<usize> {
    tokio::fs::create_dir_all(dest)
        .await
        .with_context(|| format!("Failed to create natives directory {:?}", dest))?;

    let mut extracted = 0;
    for artifact in artifacts.iter().filter(|a| a.is_native) {
        let jar_path = libraries_dir.join(&artifact.path);
        if !jar_path.exists() {
            anyhow::bail!(
                "Native library {} missing at {:?}; validate libraries first",
                artifact.name,
                jar_path
            );
        }

        let exclusions = artifact
            .extract
            .as_ref()
            .map(|e| e.exclude.clone())
            .unwrap_or_default();
        let output_dir = dest.to_path_buf();

        let count = tokio::task::spawn_blocking(move || {
            extract_jar(&jar_path, &output_dir, &exclusions)
        })
        .await??;
        extracted += count;
    }

    log::debug!("Extracted {} native files to {:?}", extracted, dest);
    Ok(extracted)
}

/// Extract a JAR file to a directory
fn extract_jar(jar_path: &Path, output_dir: &Path, exclusions: &[String]) -> Result<usize> {
    log::debug!("Extracting natives from: {:?}", jar_path);

    let file =
        std::fs::File::open(jar_path).with_context(|| format!("Failed to open JAR: {:?}", jar_path))?;

    let mut archive =
        zip::ZipArchive::new(file).with_context(|| format!("Failed to read JAR: {:?}", jar_path))?;

    let mut count = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;

        if should_exclude(entry.name(), exclusions) {
            continue;
        }

        // Entries escaping the output directory are skipped
        let Some(relative) = entry.enclosed_name() else {
            log::warn!("Skipping unsafe entry {:?} in {:?}", entry.name(), jar_path);
            continue;
        };
        let output_path = output_dir.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&output_path)?;
            continue;
        }

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut output_file = std::fs::File::create(&output_path)?;
        std::io::copy(&mut entry, &mut output_file)?;
        count += 1;
    }

    Ok(count)
}

/// Check if a file should be excluded
fn should_exclude(file_path: &str, exclusions: &[String]) -> bool {
    exclusions.iter().any(|e| file_path.starts_with(e.as_str()))
}
