pub mod installer;
pub mod launcher;
pub mod metadata;
pub mod versions;

// Re-export commonly used types
pub use installer::types::{CacheLayout, DownloadTask, ProgressReporter};
pub use launcher::rules::RuleEnv;
pub use metadata::{ManifestClient, VersionInfo, VersionManifest};
pub use versions::{VersionManager, VersionNode};
