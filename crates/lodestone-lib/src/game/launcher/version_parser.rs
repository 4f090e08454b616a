/// Version descriptor (`versions/<id>/<id>.json`) and asset index documents
use crate::game::installer::core::downloader::parse_remote_json;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One version's descriptor. Immutable once loaded; inherited settings are
/// resolved by walking the chain, never by merging documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionDescriptor {
    /// Version ID (e.g., "1.20.1" or "1.20.1-forge-47.2.0")
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,

    /// Parent version to inherit from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inherits_from: Option<String>,

    /// Game and JVM arguments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Arguments>,

    /// Legacy arguments (pre-1.13)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minecraft_arguments: Option<String>,

    #[serde(default)]
    pub libraries: Vec<Library>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_index: Option<AssetIndexRef>,

    /// Assets version (legacy)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloads: Option<VersionDownloads>,

    /// Version whose jar this one runs with
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jar: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "type")]
    pub version_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl VersionDescriptor {
    /// The main jar download this version declares itself
    pub fn client_download(&self) -> Option<&Artifact> {
        self.downloads.as_ref().and_then(|d| d.client.as_ref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionDownloads {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<Artifact>,
}

/// Game and JVM arguments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub game: Vec<Argument>,

    #[serde(default)]
    pub jvm: Vec<Argument>,
}

/// Argument that can be simple or conditional
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    Simple(String),

    Conditional {
        rules: Vec<Rule>,
        value: ArgumentValue,
    },
}

/// Argument value can be a single string or array
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    Single(String),
    Multiple(Vec<String>),
}

impl ArgumentValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            ArgumentValue::Single(s) => vec![s.as_str()],
            ArgumentValue::Multiple(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

/// Rule for conditional arguments/libraries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub action: RuleAction,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<OsRule>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<HashMap<String, bool>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OsRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Regular expression tested against the OS version string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
}

/// Library definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    /// Maven coordinates
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloads: Option<LibraryDownloads>,

    /// Custom Maven repository URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,

    /// OS name -> native classifier, may contain `${arch}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub natives: Option<HashMap<String, String>>,

    /// Extract rules for natives
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract: Option<ExtractRules>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryDownloads {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Artifact>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifiers: Option<HashMap<String, Artifact>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractRules {
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Asset index reference inside a descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndexRef {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// `assets/indexes/<id>.json`: logical name -> content-addressed object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetIndex {
    #[serde(default)]
    pub objects: HashMap<String, AssetObject>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetObject {
    pub hash: String,
    pub size: u64,
}

/// Parse descriptor bytes; `origin` names the document in errors
pub fn parse_descriptor(bytes: &[u8], origin: &str) -> Result<VersionDescriptor> {
    parse_remote_json(bytes, origin)
}

/// Read a cached descriptor from disk
pub async fn read_descriptor(path: &Path) -> Result<VersionDescriptor> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read version descriptor at {:?}", path))?;
    parse_descriptor(&bytes, &path.to_string_lossy())
}

/// Read a cached asset index from disk
pub async fn read_asset_index(path: &Path) -> Result<AssetIndex> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read asset index at {:?}", path))?;
    parse_remote_json(&bytes, &path.to_string_lossy())
}
