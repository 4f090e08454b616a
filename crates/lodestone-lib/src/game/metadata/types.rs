use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Remote catalog of every published version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionManifest {
    pub latest: LatestVersions,
    pub versions: Vec<VersionInfo>,
}

/// Latest version information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestVersions {
    pub release: String,
    pub snapshot: String,
}

/// One manifest entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub id: String,

    /// Version type (release, snapshot, old_alpha, old_beta)
    #[serde(rename = "type")]
    pub version_type: String,

    /// Descriptor URL
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_time: Option<DateTime<Utc>>,

    /// Descriptor SHA1 (v2 manifest only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
}

impl VersionInfo {
    pub fn is_release(&self) -> bool {
        self.version_type == "release"
    }
}

impl VersionManifest {
    pub fn find(&self, id: &str) -> Option<&VersionInfo> {
        self.versions.iter().find(|v| v.id == id)
    }
}
