use super::types::DownloadFailure;
use std::path::PathBuf;

/// Terminal failures of the install/validate/cleanup engine.
///
/// Operations return `anyhow::Result`; these variants travel inside it and can
/// be recovered with `err.downcast_ref::<InstallError>()`.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("Version {id} is not present in the version manifest")]
    NotFoundInManifest { id: String },

    #[error("No local data for version {id}; install it first")]
    LocalDataMissing { id: String },

    #[error("Failed to download {failed} of {total} files")]
    AggregateDownloadFailure {
        failed: usize,
        total: usize,
        failures: Vec<DownloadFailure>,
    },

    #[error("Malformed data from {origin}: {reason}")]
    MalformedRemoteData { origin: String, reason: String },

    #[error("Inheritance cycle: {}", .chain.join(" -> "))]
    InheritanceCycle { chain: Vec<String> },

    #[error("Version {id} is not loaded")]
    VersionNotLoaded { id: String },

    #[error("{} version(s) failed: {}", .failures.len(), summarize(.failures))]
    VersionsFailed { failures: Vec<(String, String)> },

    #[error("Cache is locked by another process (remove {path:?} if it is stale)")]
    CacheBusy { path: PathBuf },
}

impl InstallError {
    pub fn malformed(origin: impl Into<String>, reason: impl ToString) -> Self {
        InstallError::MalformedRemoteData {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }
}

fn summarize(failures: &[(String, String)]) -> String {
    failures
        .iter()
        .map(|(id, reason)| format!("{} ({})", id, reason))
        .collect::<Vec<_>>()
        .join(", ")
}
