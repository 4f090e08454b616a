use crate::game::installer::types::DownloadTask;
use anyhow::Result;
use futures::future::BoxFuture;

/// Transfers one remote file to its destination path.
/// The batch scheduler only talks to this seam, so the transport can be
/// swapped (HTTP in production, in-process fakes in tests).
pub trait ArtifactFetcher: Send + Sync {
    /// Fetch `task.url` into `task.save_path`, creating parent directories.
    /// A failed fetch must not leave a partial file at `task.save_path`.
    fn fetch<'a>(&'a self, task: &'a DownloadTask) -> BoxFuture<'a, Result<()>>;
}
