use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Progress reporter trait for installer operations
/// Implementations forward updates to whatever front-end drives the engine
pub trait ProgressReporter: Send + Sync {
    /// Start a new step with optional total task count
    fn start_step(&self, name: &str, total: Option<u32>);

    /// Set a short status message
    fn set_message(&self, message: &str);

    /// Called once per download task when it settles, successfully or not.
    /// `index` is the task's position in its batch, `completed` counts settled
    /// tasks so far (including this one).
    fn task_settled(&self, index: usize, completed: usize, total: usize, ok: bool);
}

/// A progress reporter that does nothing (silent).
/// Useful for background verification or tests.
pub struct SilentProgressReporter;

impl ProgressReporter for SilentProgressReporter {
    fn start_step(&self, _name: &str, _total: Option<u32>) {}
    fn set_message(&self, _message: &str) {}
    fn task_settled(&self, _index: usize, _completed: usize, _total: usize, _ok: bool) {}
}

/// One file to fetch from the distribution service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub url: String,
    pub save_path: PathBuf,
    pub expected_size: Option<u64>,
    /// When present the fetched body must hash to this value
    pub expected_sha1: Option<String>,
}

impl DownloadTask {
    pub fn new(url: impl Into<String>, save_path: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            save_path: save_path.into(),
            expected_size: None,
            expected_sha1: None,
        }
    }

    pub fn with_sha1(mut self, sha1: Option<String>) -> Self {
        self.expected_sha1 = sha1;
        self
    }

    pub fn with_size(mut self, size: Option<u64>) -> Self {
        self.expected_size = size;
        self
    }
}

/// A task that did not complete, kept for the aggregate batch error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadFailure {
    pub index: usize,
    pub url: String,
    pub path: PathBuf,
    pub reason: String,
}

/// On-disk layout of the cache, all paths derived from one root
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the path to the versions directory
    pub fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    pub fn version_dir(&self, id: &str) -> PathBuf {
        self.versions_dir().join(id)
    }

    /// `versions/<id>/<id>.json`
    pub fn descriptor_path(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(format!("{}.json", id))
    }

    /// `versions/<id>/<id>.jar`
    pub fn jar_path(&self, id: &str) -> PathBuf {
        self.version_dir(id).join(format!("{}.jar", id))
    }

    /// Get the path to the libraries directory
    pub fn libraries_dir(&self) -> PathBuf {
        self.root.join("libraries")
    }

    /// Get the path to the assets directory
    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }

    pub fn asset_indexes_dir(&self) -> PathBuf {
        self.assets_dir().join("indexes")
    }

    pub fn asset_index_path(&self, index_id: &str) -> PathBuf {
        self.asset_indexes_dir().join(format!("{}.json", index_id))
    }

    pub fn asset_objects_dir(&self) -> PathBuf {
        self.assets_dir().join("objects")
    }

    /// Content-addressed location: `objects/<hash[0:2]>/<hash>`
    pub fn asset_object_path(&self, hash: &str) -> PathBuf {
        self.asset_objects_dir()
            .join(hash_prefix(hash))
            .join(hash)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(".lodestone.lock")
    }
}

/// Shard directory name of a content hash
pub fn hash_prefix(hash: &str) -> &str {
    hash.get(0..2).unwrap_or(hash)
}
