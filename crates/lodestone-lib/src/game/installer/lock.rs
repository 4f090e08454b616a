use super::error::InstallError;
use super::types::CacheLayout;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

/// Advisory lock over a cache root, held while the cache is mutated.
///
/// The lock file is created exclusively and removed on drop. A lock left
/// behind by a crashed process has to be removed by hand.
#[derive(Debug)]
pub struct CacheLock {
    path: PathBuf,
}

impl CacheLock {
    pub fn acquire(layout: &CacheLayout) -> Result<Self> {
        let path = layout.lock_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache root {:?}", parent))?;
        }

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(mut file) => {
                let _ = writeln!(file, "{}", std::process::id());
                log::debug!("Acquired cache lock {:?}", path);
                Ok(Self { path })
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(InstallError::CacheBusy { path }.into())
            }
            Err(e) => Err(anyhow::Error::new(e).context(format!("Failed to create lock {:?}", path))),
        }
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            log::warn!("Failed to release cache lock {:?}: {}", self.path, e);
        }
    }
}
