use crate::game::installer::types::DownloadTask;
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use sha1::{Digest, Sha1};
use std::path::Path;
use tokio::io::AsyncReadExt;

const HASH_CHUNK: usize = 8 * 1024;

/// Streaming SHA1 of a file on disk, lowercase hex
pub async fn sha1_file(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open {:?} for hashing", path))?;
    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; HASH_CHUNK];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Decide whether a local file must be (re)fetched.
///
/// Missing files always need a fetch. With a known hash the file is kept only
/// when it hashes to it. Without one, an existing file is trusted unless
/// `force_if_no_hash` is set.
pub async fn needs_fetch(path: &Path, expected_sha1: Option<&str>, force_if_no_hash: bool) -> bool {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return true;
    }

    match expected_sha1 {
        Some(expected) => match sha1_file(path).await {
            Ok(actual) => {
                if actual.eq_ignore_ascii_case(expected) {
                    false
                } else {
                    log::debug!(
                        "Hash mismatch for {:?}: expected {}, found {}",
                        path,
                        expected,
                        actual
                    );
                    true
                }
            }
            Err(e) => {
                log::warn!("Could not hash {:?}: {}", path, e);
                true
            }
        },
        None => force_if_no_hash,
    }
}

/// Keep only the tasks whose destination is missing or invalid.
/// Hash checks run `concurrency` at a time; submission order is preserved.
pub async fn filter_needed(
    tasks: Vec<DownloadTask>,
    force_if_no_hash: bool,
    concurrency: usize,
) -> Vec<DownloadTask> {
    stream::iter(tasks)
        .map(|task| async move {
            let needed =
                needs_fetch(&task.save_path, task.expected_sha1.as_deref(), force_if_no_hash).await;
            needed.then_some(task)
        })
        .buffered(concurrency.max(1))
        .filter_map(|t| async move { t })
        .collect()
        .await
}
