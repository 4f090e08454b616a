use super::node::{ValidationStage, VersionNode};
use crate::game::installer::config::EngineConfig;
use crate::game::installer::core::downloader::build_client;
use crate::game::installer::core::validator::{filter_needed, needs_fetch};
use crate::game::installer::core::{ArtifactFetcher, BatchDownloader, HttpFetcher};
use crate::game::installer::error::InstallError;
use crate::game::installer::types::{
    hash_prefix, CacheLayout, DownloadTask, ProgressReporter, SilentProgressReporter,
};
use crate::game::launcher::arguments::{
    build_variables, collect_fragments, substitute_all, ArgumentContext, EffectiveArguments,
    VariableInputs,
};
use crate::game::launcher::classpath::{
    classpath_separator, coordinate_key, join_url, resolve_artifacts, ResolvedArtifact,
};
use crate::game::launcher::natives;
use crate::game::launcher::rules::{is_allowed, RuleEnv};
use crate::game::launcher::version_parser::{
    parse_descriptor, read_asset_index, read_descriptor, AssetIndex, AssetIndexRef,
    VersionDescriptor,
};
use crate::game::metadata::{LatestVersions, ManifestClient, VersionInfo, VersionManifest};
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Asset index id used when a descriptor names none
pub const LEGACY_ASSET_INDEX: &str = "legacy";

/// Registry of version nodes and the operations over their inheritance chains.
///
/// Each id maps to exactly one `VersionNode` for the lifetime of the manager.
/// Nodes refer to their parent by id; every chain walk goes through this
/// registry.
pub struct VersionManager {
    config: EngineConfig,
    layout: CacheLayout,
    env: RuleEnv,
    manifest: ManifestClient,
    fetcher: Arc<dyn ArtifactFetcher>,
    reporter: Arc<dyn ProgressReporter>,
    nodes: HashMap<String, VersionNode>,
    asset_indexes: HashMap<String, Arc<AssetIndex>>,
}

impl VersionManager {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let client = build_client()?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: EngineConfig, client: Client) -> Self {
        Self {
            layout: config.layout(),
            env: RuleEnv::for_config(&config),
            manifest: ManifestClient::new(client.clone(), config.manifest_url.clone()),
            fetcher: Arc::new(HttpFetcher::new(client)),
            reporter: Arc::new(SilentProgressReporter),
            nodes: HashMap::new(),
            asset_indexes: HashMap::new(),
            config,
        }
    }

    /// Replace the transport used for every artifact download
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ArtifactFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_rule_env(mut self, env: RuleEnv) -> Self {
        self.env = env;
        self
    }

    /// Use an already known manifest instead of fetching one
    pub fn with_manifest(mut self, manifest: VersionManifest) -> Self {
        self.manifest = ManifestClient::with_manifest(Client::new(), manifest);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    pub fn rule_env(&self) -> &RuleEnv {
        &self.env
    }

    fn batch(&self) -> BatchDownloader {
        BatchDownloader::new(self.fetcher.clone(), self.config.concurrency())
    }

    // ------------------------------------------------------------------
    // Registry
    // ------------------------------------------------------------------

    /// The node for `id`, registering an unloaded one on first use
    pub fn get_version(&mut self, id: &str) -> &VersionNode {
        self.nodes
            .entry(id.to_string())
            .or_insert_with(|| VersionNode::new(id))
    }

    pub fn node(&self, id: &str) -> Option<&VersionNode> {
        self.nodes.get(id)
    }

    /// Ids of every loaded node, sorted
    pub fn loaded_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .nodes
            .values()
            .filter(|n| n.is_loaded())
            .map(|n| n.id().to_string())
            .collect();
        ids.sort();
        ids
    }

    /// Ask for the descriptor of `id` to be re-fetched on its next load
    pub fn mark_refresh(&mut self, id: &str) {
        self.get_version(id);
        if let Some(node) = self.nodes.get_mut(id) {
            node.mark_refresh();
        }
    }

    fn descriptor(&self, id: &str) -> Result<Arc<VersionDescriptor>> {
        self.nodes
            .get(id)
            .and_then(|n| n.descriptor().cloned())
            .ok_or_else(|| InstallError::VersionNotLoaded { id: id.to_string() }.into())
    }

    // ------------------------------------------------------------------
    // Manifest queries
    // ------------------------------------------------------------------

    pub async fn version_info(&self, id: &str) -> Result<Option<VersionInfo>> {
        self.manifest.version_info(id).await
    }

    pub async fn available_versions(&self) -> Result<Vec<VersionInfo>> {
        self.manifest.available().await
    }

    pub async fn latest(&self) -> Result<LatestVersions> {
        self.manifest.latest().await
    }

    // ------------------------------------------------------------------
    // Installed versions on disk
    // ------------------------------------------------------------------

    pub fn is_installed(&self, id: &str) -> bool {
        self.layout.descriptor_path(id).is_file()
    }

    /// Version directories holding a cached descriptor, sorted
    pub async fn list_installed(&self) -> Result<Vec<String>> {
        let versions_dir = self.layout.versions_dir();
        if !versions_dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let mut entries = tokio::fs::read_dir(&versions_dir)
            .await
            .with_context(|| format!("Failed to read {:?}", versions_dir))?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let Ok(id) = entry.file_name().into_string() else {
                continue;
            };
            if self.is_installed(&id) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Load `id` and, recursively, its ancestors.
    ///
    /// A missing local descriptor is fetched only when `allow_fetch` is set,
    /// otherwise the load fails with `LocalDataMissing`. Inheritance cycles are
    /// rejected with `InheritanceCycle`.
    pub async fn load_version(&mut self, id: &str, allow_fetch: bool) -> Result<()> {
        let mut visiting = Vec::new();
        self.load_inner(id.to_string(), allow_fetch, &mut visiting)
            .await
    }

    fn load_inner<'a>(
        &'a mut self,
        id: String,
        allow_fetch: bool,
        visiting: &'a mut Vec<String>,
    ) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if let Some(pos) = visiting.iter().position(|v| *v == id) {
                let mut chain = visiting[pos..].to_vec();
                chain.push(id);
                return Err(InstallError::InheritanceCycle { chain }.into());
            }

            let node = self.get_version(&id);
            let parent = if node.is_loaded() && !node.needs_refresh() {
                node.parent_id().map(str::to_string)
            } else {
                let refresh = node.needs_refresh();
                let descriptor = self.read_or_fetch_descriptor(&id, allow_fetch, refresh).await?;
                let parent = descriptor.inherits_from.clone();
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.set_loaded(descriptor);
                }
                log::debug!("Loaded version {}", id);
                parent
            };

            if let Some(parent) = parent {
                visiting.push(id.clone());
                let result = self.load_inner(parent.clone(), allow_fetch, visiting).await;
                visiting.pop();
                result.with_context(|| format!("Failed to load {} (parent of {})", parent, id))?;
            }
            Ok(())
        })
    }

    async fn read_or_fetch_descriptor(
        &self,
        id: &str,
        allow_fetch: bool,
        refresh: bool,
    ) -> Result<VersionDescriptor> {
        let path = self.layout.descriptor_path(id);
        let exists = path.is_file();

        if exists && (!refresh || !allow_fetch) {
            return read_descriptor(&path).await;
        }
        if !exists && !allow_fetch {
            return Err(InstallError::LocalDataMissing { id: id.to_string() }.into());
        }

        let info = self.manifest.find(id).await?;
        if exists && !needs_fetch(&path, info.sha1.as_deref(), true).await {
            log::debug!("Descriptor for {} is up to date", id);
            return read_descriptor(&path).await;
        }

        log::info!("Fetching descriptor for {}", id);
        // The cached copy is only replaced by a descriptor that parses
        let staged = path.with_extension("json.new");
        let task = DownloadTask::new(info.url.clone(), staged.clone()).with_sha1(info.sha1.clone());
        self.fetcher
            .fetch(&task)
            .await
            .with_context(|| format!("Failed to fetch descriptor for {}", id))?;

        let parsed = match tokio::fs::read(&staged).await {
            Ok(bytes) => parse_descriptor(&bytes, &info.url),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Failed to read fetched descriptor {:?}", staged))),
        };
        match parsed {
            Ok(descriptor) => {
                tokio::fs::rename(&staged, &path)
                    .await
                    .with_context(|| format!("Failed to store descriptor at {:?}", path))?;
                Ok(descriptor)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&staged).await;
                if exists {
                    log::warn!("Keeping cached descriptor for {}: {:#}", id, e);
                }
                Err(e)
            }
        }
    }

    /// Load every installed version.
    ///
    /// With `force_refresh`, versions still published in the remote manifest
    /// have their descriptor re-fetched when it changed. Every version is
    /// attempted; failures are reported together as `VersionsFailed`.
    pub async fn load_all_installed(&mut self, force_refresh: bool) -> Result<Vec<String>> {
        let ids = self.list_installed().await?;
        let mut failures = Vec::new();

        for id in &ids {
            if force_refresh {
                match self.manifest.version_info(id).await {
                    Ok(Some(_)) => self.mark_refresh(id),
                    Ok(None) => log::debug!("{} is not a published version, keeping local copy", id),
                    Err(e) => log::warn!("Could not check {} against the manifest: {:#}", id, e),
                }
            }

            if let Err(e) = self.load_version(id, force_refresh).await {
                log::error!("Failed to load {}: {:#}", id, e);
                failures.push((id.clone(), format!("{:#}", e)));
            }
        }

        if !failures.is_empty() {
            return Err(InstallError::VersionsFailed { failures }.into());
        }
        log::info!("Loaded {} installed versions", ids.len());
        Ok(ids)
    }

    // ------------------------------------------------------------------
    // Chain views
    // ------------------------------------------------------------------

    /// Descriptors from `id` to its root ancestor, child first
    pub fn chain(&self, id: &str) -> Result<Vec<Arc<VersionDescriptor>>> {
        let mut out = Vec::new();
        let mut seen: Vec<String> = Vec::new();
        let mut current = id.to_string();

        loop {
            if seen.contains(&current) {
                seen.push(current);
                return Err(InstallError::InheritanceCycle { chain: seen }.into());
            }
            let descriptor = self.descriptor(&current)?;
            seen.push(current);
            let parent = descriptor.inherits_from.clone();
            out.push(descriptor);
            match parent {
                Some(p) => current = p,
                None => break,
            }
        }
        Ok(out)
    }

    /// Ids from `id` to its root ancestor, child first
    pub fn chain_ids(&self, id: &str) -> Result<Vec<String>> {
        let mut ids = vec![id.to_string()];
        for descriptor in self.chain(id)?.iter().skip(1) {
            ids.push(descriptor.id.clone());
        }
        Ok(ids)
    }

    /// Libraries applicable on this platform across the chain.
    ///
    /// A coordinate declared by a descendant hides the same coordinate in
    /// every ancestor. Repeats within one descriptor are all kept, since a
    /// descriptor may list a library once for its jar and again for its
    /// natives. Artifacts are unique by path.
    pub fn effective_libraries(&self, id: &str) -> Result<Vec<ResolvedArtifact>> {
        let mut overridden: HashSet<String> = HashSet::new();
        let mut seen_paths = HashSet::new();
        let mut out = Vec::new();

        for descriptor in self.chain(id)? {
            let mut declared_here = HashSet::new();
            for lib in &descriptor.libraries {
                if !is_allowed(lib.rules.as_deref(), &self.env) {
                    continue;
                }
                let key = coordinate_key(&lib.name);
                if overridden.contains(&key) {
                    log::debug!("{} overridden by a descendant of {}", lib.name, descriptor.id);
                    continue;
                }
                declared_here.insert(key);
                for artifact in resolve_artifacts(lib, &self.env, &self.config.libraries_base_url)? {
                    if seen_paths.insert(artifact.path.clone()) {
                        out.push(artifact);
                    }
                }
            }
            overridden.extend(declared_here);
        }
        Ok(out)
    }

    /// Version whose jar `id` runs with: its own when it declares a client
    /// download, else the one named by `jar`, else the parent's owner.
    pub fn jar_owner(&self, id: &str) -> Result<String> {
        let mut current = id.to_string();
        let mut seen = HashSet::new();

        loop {
            if !seen.insert(current.clone()) {
                return Err(InstallError::InheritanceCycle {
                    chain: vec![id.to_string(), current],
                }
                .into());
            }
            let descriptor = self.descriptor(&current)?;
            if descriptor.client_download().is_some() {
                return Ok(current);
            }
            if let Some(ref jar) = descriptor.jar {
                if *jar != current {
                    return Ok(jar.clone());
                }
            }
            match descriptor.inherits_from {
                Some(ref parent) => current = parent.clone(),
                None => return Ok(current),
            }
        }
    }

    /// Library paths (child first, deduplicated) followed by the main jar
    pub fn classpath(&self, id: &str) -> Result<Vec<PathBuf>> {
        let libraries_dir = self.layout.libraries_dir();
        let mut entries: Vec<PathBuf> = self
            .effective_libraries(id)?
            .into_iter()
            .filter(|a| !a.is_native)
            .map(|a| libraries_dir.join(a.path))
            .collect();
        entries.push(self.layout.jar_path(&self.jar_owner(id)?));
        Ok(entries)
    }

    pub fn classpath_string(&self, id: &str) -> Result<String> {
        let entries: Vec<String> = self
            .classpath(id)?
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect();
        Ok(entries.join(classpath_separator()))
    }

    /// Nearest asset index reference along the chain
    pub fn asset_index_ref(&self, id: &str) -> Result<Option<AssetIndexRef>> {
        Ok(self
            .chain(id)?
            .iter()
            .find_map(|d| d.asset_index.clone()))
    }

    /// Asset index id: nearest `assetIndex`, else nearest `assets`, else `legacy`
    pub fn asset_index_id(&self, id: &str) -> Result<String> {
        let chain = self.chain(id)?;
        let from_ref = chain
            .iter()
            .find_map(|d| d.asset_index.as_ref().map(|r| r.id.clone()));
        let from_assets = || chain.iter().find_map(|d| d.assets.clone());
        Ok(from_ref
            .or_else(from_assets)
            .unwrap_or_else(|| LEGACY_ASSET_INDEX.to_string()))
    }

    /// JVM and game arguments with placeholders substituted
    pub fn effective_arguments(&self, id: &str, ctx: &ArgumentContext) -> Result<EffectiveArguments> {
        let chain = self.chain(id)?;
        let links: Vec<&VersionDescriptor> = chain.iter().map(|d| d.as_ref()).collect();
        let fragments = collect_fragments(&links, &self.env);

        let version_type = chain
            .iter()
            .find_map(|d| d.version_type.clone())
            .unwrap_or_else(|| "release".to_string());
        let classpath = self.classpath_string(id)?;
        let assets_index_name = self.asset_index_id(id)?;
        let assets_dir = self.layout.assets_dir();
        let libraries_dir = self.layout.libraries_dir();

        let inputs = VariableInputs {
            version_name: id,
            version_type: &version_type,
            root_dir: self.layout.root(),
            assets_dir: &assets_dir,
            libraries_dir: &libraries_dir,
            assets_index_name: &assets_index_name,
            classpath: &classpath,
            launcher_name: &self.config.launcher_name,
            launcher_version: &self.config.launcher_version,
            resolution: self.config.resolution,
        };
        let vars = build_variables(&inputs, ctx);
        Ok(substitute_all(fragments, &vars))
    }

    /// Extract the chain's native libraries into `dest`
    pub async fn extract_natives(&self, id: &str, dest: &Path) -> Result<usize> {
        let artifacts = self.effective_libraries(id)?;
        natives::extract_natives(&artifacts, &self.layout.libraries_dir(), dest).await
    }

    // ------------------------------------------------------------------
    // Validation
    //
    // A stage is marked validated only after its batch fully succeeds, so a
    // failed stage is retried on the next call within the same process.
    // ------------------------------------------------------------------

    fn is_validated(&self, id: &str, stage: ValidationStage) -> bool {
        self.nodes
            .get(id)
            .map(|n| n.is_validated(stage))
            .unwrap_or(false)
    }

    fn mark_validated(&mut self, id: &str, stage: ValidationStage) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.mark_validated(stage);
        }
    }

    async fn fetch_missing(
        &self,
        step: &str,
        tasks: Vec<DownloadTask>,
        force_if_no_hash: bool,
    ) -> Result<usize> {
        let total = tasks.len();
        let needed = filter_needed(tasks, force_if_no_hash, self.config.concurrency()).await;
        let count = needed.len();
        let status = format!("{}: {} of {} files need fetching", step, count, total);
        log::info!("{}", status);
        self.reporter.set_message(&status);

        if count > 0 {
            self.reporter.start_step(step, Some(count as u32));
            self.batch().run(needed, self.reporter.clone()).await?;
        }
        Ok(count)
    }

    /// Fetch missing or corrupt libraries for the whole chain of `id`.
    /// Unhashed files that exist are trusted unless `force_unverified` is set.
    pub async fn validate_libraries(&mut self, id: &str, force_unverified: bool) -> Result<()> {
        if self.is_validated(id, ValidationStage::Libraries) {
            return Ok(());
        }

        let libraries_dir = self.layout.libraries_dir();
        let tasks: Vec<DownloadTask> = self
            .effective_libraries(id)?
            .into_iter()
            .map(|a| {
                DownloadTask::new(a.url, libraries_dir.join(&a.path))
                    .with_sha1(a.sha1)
                    .with_size(a.size)
            })
            .collect();

        self.fetch_missing(&format!("Libraries for {}", id), tasks, force_unverified)
            .await
            .with_context(|| format!("Library validation failed for {}", id))?;
        self.mark_validated(id, ValidationStage::Libraries);
        Ok(())
    }

    /// Fetch the asset index named by the chain of `id` when missing or stale
    pub async fn validate_asset_index(&mut self, id: &str) -> Result<()> {
        if self.is_validated(id, ValidationStage::AssetIndex) {
            return Ok(());
        }

        match self.asset_index_ref(id)? {
            Some(index_ref) => {
                let path = self.layout.asset_index_path(&index_ref.id);
                match index_ref.url {
                    Some(ref url) => {
                        let task = DownloadTask::new(url.clone(), path.clone())
                            .with_sha1(index_ref.sha1.clone())
                            .with_size(index_ref.size);
                        self.fetch_missing(&format!("Asset index {}", index_ref.id), vec![task], false)
                            .await
                            .with_context(|| format!("Asset index validation failed for {}", id))?;
                    }
                    None if !path.exists() => {
                        log::warn!("Asset index {} has no download URL", index_ref.id);
                    }
                    None => {}
                }
                // Parse now so a corrupt index fails here, not during assets
                self.load_asset_index(&index_ref.id).await?;
            }
            None => log::debug!("{} declares no asset index", id),
        }

        self.mark_validated(id, ValidationStage::AssetIndex);
        Ok(())
    }

    /// Parsed asset index, read from disk once per manager
    async fn load_asset_index(&mut self, index_id: &str) -> Result<Option<Arc<AssetIndex>>> {
        if let Some(index) = self.asset_indexes.get(index_id) {
            return Ok(Some(index.clone()));
        }
        let path = self.layout.asset_index_path(index_id);
        if !path.exists() {
            return Ok(None);
        }
        let index = Arc::new(read_asset_index(&path).await?);
        self.asset_indexes
            .insert(index_id.to_string(), index.clone());
        Ok(Some(index))
    }

    /// Fetch every missing or corrupt asset object of the chain's index
    pub async fn validate_assets(&mut self, id: &str) -> Result<()> {
        if self.is_validated(id, ValidationStage::Assets) {
            return Ok(());
        }

        let index_id = self.asset_index_id(id)?;
        let Some(index) = self.load_asset_index(&index_id).await? else {
            log::debug!("No asset index {} on disk for {}", index_id, id);
            self.mark_validated(id, ValidationStage::Assets);
            return Ok(());
        };

        // Several logical names may share one object
        let mut hashes: Vec<(&str, u64)> = index
            .objects
            .values()
            .map(|o| (o.hash.as_str(), o.size))
            .collect();
        hashes.sort();
        hashes.dedup_by(|a, b| a.0 == b.0);

        let base = &self.config.resources_base_url;
        let tasks: Vec<DownloadTask> = hashes
            .into_iter()
            .map(|(hash, size)| {
                let url = join_url(base, &format!("{}/{}", hash_prefix(hash), hash));
                DownloadTask::new(url, self.layout.asset_object_path(hash))
                    .with_sha1(Some(hash.to_string()))
                    .with_size(Some(size))
            })
            .collect();

        self.fetch_missing(&format!("Assets for {}", id), tasks, false)
            .await
            .with_context(|| format!("Asset validation failed for {}", id))?;
        self.mark_validated(id, ValidationStage::Assets);
        Ok(())
    }

    /// Fetch the main jar, delegating to the version that owns it
    pub async fn validate_jar(&mut self, id: &str) -> Result<()> {
        if self.is_validated(id, ValidationStage::Jar) {
            return Ok(());
        }

        let owner = self.jar_owner(id)?;
        if !self.node(&owner).map(|n| n.is_loaded()).unwrap_or(false) {
            self.load_version(&owner, true).await?;
        }

        let descriptor = self.descriptor(&owner)?;
        let path = self.layout.jar_path(&owner);
        match descriptor.client_download() {
            Some(download) => {
                let url = download
                    .url
                    .clone()
                    .ok_or_else(|| InstallError::malformed(&owner, "client download has no url"))?;
                let task = DownloadTask::new(url, path)
                    .with_sha1(download.sha1.clone())
                    .with_size(download.size);
                self.fetch_missing(&format!("Client jar {}", owner), vec![task], false)
                    .await
                    .with_context(|| format!("Jar validation failed for {}", id))?;
            }
            None if !path.exists() => {
                log::warn!("{} declares no client download and has no jar", owner);
            }
            None => {}
        }

        self.mark_validated(&owner, ValidationStage::Jar);
        self.mark_validated(id, ValidationStage::Jar);
        Ok(())
    }

    /// Run every validation stage for `id` and then each ancestor.
    /// The first failing stage aborts this version's validation.
    pub async fn validate_all(&mut self, id: &str, force_unverified: bool) -> Result<()> {
        for link in self.chain_ids(id)? {
            self.validate_libraries(&link, force_unverified).await?;
            self.validate_asset_index(&link).await?;
            self.validate_assets(&link).await?;
            self.validate_jar(&link).await?;
        }
        log::info!("Version {} is complete", id);
        Ok(())
    }

    /// Validate every loaded version independently
    pub async fn validate_all_loaded(&mut self, force_unverified: bool) -> Result<()> {
        let mut failures = Vec::new();
        for id in self.loaded_ids() {
            if let Err(e) = self.validate_all(&id, force_unverified).await {
                log::error!("Validation of {} failed: {:#}", id, e);
                failures.push((id, format!("{:#}", e)));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(InstallError::VersionsFailed { failures }.into())
        }
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Remove the version's own directory. Shared libraries and assets are
    /// left for `cleanup`.
    pub async fn delete_version(&mut self, id: &str) -> Result<bool> {
        let dependents: Vec<&str> = self
            .nodes
            .values()
            .filter(|n| n.parent_id() == Some(id))
            .map(|n| n.id())
            .collect();
        if !dependents.is_empty() {
            log::warn!("{} is inherited by {:?}", id, dependents);
        }

        self.nodes.remove(id);

        let dir = self.layout.version_dir(id);
        if !dir.exists() {
            return Ok(false);
        }
        tokio::fs::remove_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to remove {:?}", dir))?;
        log::info!("Removed version {}", id);
        Ok(true)
    }
}
