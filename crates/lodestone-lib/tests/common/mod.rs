#![allow(dead_code)]

use anyhow::Result;
use futures::future::BoxFuture;
use lodestone_lib::game::installer::core::ArtifactFetcher;
use lodestone_lib::game::{CacheLayout, DownloadTask, ProgressReporter, RuleEnv};
use lodestone_lib::{EngineConfig, VersionManager};
use sha1::{Digest, Sha1};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn sha1_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha1::digest(bytes))
}

/// In-process transport serving fixed bodies by URL
#[derive(Default)]
pub struct MemoryFetcher {
    bodies: HashMap<String, Vec<u8>>,
    fail: HashSet<String>,
    delay: Duration,
    requests: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_string(), body.to_vec());
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.fail.insert(url.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn write(&self, task: &DownloadTask) -> Result<()> {
        if self.fail.contains(&task.url) {
            anyhow::bail!("connection reset: {}", task.url);
        }
        let Some(body) = self.bodies.get(&task.url) else {
            anyhow::bail!("HTTP error 404 Not Found: {}", task.url);
        };
        if let Some(ref expected) = task.expected_sha1 {
            let actual = sha1_hex(body);
            if &actual != expected {
                anyhow::bail!("SHA1 mismatch for {}", task.url);
            }
        }
        if let Some(parent) = task.save_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&task.save_path, body).await?;
        Ok(())
    }
}

impl ArtifactFetcher for MemoryFetcher {
    fn fetch<'a>(&'a self, task: &'a DownloadTask) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.requests.lock().unwrap().push(task.url.clone());

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let result = self.write(task).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        })
    }
}

/// Reporter keeping every step, message and settled task
#[derive(Default)]
pub struct RecordingReporter {
    pub steps: Mutex<Vec<String>>,
    pub messages: Mutex<Vec<String>>,
    pub settled: Mutex<Vec<(usize, usize, bool)>>,
}

impl ProgressReporter for RecordingReporter {
    fn start_step(&self, name: &str, _total: Option<u32>) {
        self.steps.lock().unwrap().push(name.to_string());
    }
    fn set_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
    fn task_settled(&self, index: usize, completed: usize, _total: usize, ok: bool) {
        self.settled.lock().unwrap().push((index, completed, ok));
    }
}

pub fn linux_env() -> RuleEnv {
    RuleEnv {
        os_name: "linux".into(),
        os_version: "6.1.0".into(),
        os_arch: "x86_64".into(),
        arch_bits: "64".into(),
        has_custom_resolution: false,
        is_demo_user: false,
    }
}

pub fn windows_env() -> RuleEnv {
    RuleEnv {
        os_name: "windows".into(),
        os_version: "10.0.19045".into(),
        ..linux_env()
    }
}

/// Config rooted at `root` with endpoints under a fake host
pub fn test_config(root: &Path) -> EngineConfig {
    EngineConfig {
        download_concurrency: 4,
        manifest_url: "http://meta.test/mc/game/version_manifest_v2.json".into(),
        libraries_base_url: "http://libraries.test/".into(),
        resources_base_url: "http://resources.test/".into(),
        ..EngineConfig::with_root(root)
    }
}

/// Manager that never touches the network unless a fetcher is supplied
pub fn offline_manager(root: &Path) -> VersionManager {
    VersionManager::with_client(test_config(root), reqwest::Client::new())
        .with_rule_env(linux_env())
}

pub fn write_descriptor(layout: &CacheLayout, id: &str, descriptor: serde_json::Value) {
    let path = layout.descriptor_path(id);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_vec_pretty(&descriptor).unwrap()).unwrap();
}

pub fn write_file(path: &Path, body: &[u8]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

/// Library entry with a declared artifact path
pub fn library(name: &str, path: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "downloads": {"artifact": {
            "path": path,
            "url": format!("http://libraries.test/{}", path),
            "sha1": null,
            "size": null
        }}
    })
}

/// Library entry carrying the hash and size of `body`
pub fn hashed_library(name: &str, path: &str, body: &[u8]) -> serde_json::Value {
    let mut lib = library(name, path);
    lib["downloads"]["artifact"]["sha1"] = sha1_hex(body).into();
    lib["downloads"]["artifact"]["size"] = body.len().into();
    lib
}

pub fn library_url(path: &str) -> String {
    format!("http://libraries.test/{}", path)
}

/// Manifest listing no versions
pub fn empty_manifest() -> lodestone_lib::game::VersionManifest {
    serde_json::from_value(serde_json::json!({
        "latest": {"release": "", "snapshot": ""},
        "versions": []
    }))
    .unwrap()
}
