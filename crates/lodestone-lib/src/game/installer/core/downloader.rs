use super::traits::ArtifactFetcher;
use crate::game::installer::config::request_timeout;
use crate::game::installer::error::InstallError;
use crate::game::installer::types::DownloadTask;
use anyhow::{Context, Result};
use futures::future::BoxFuture;
use futures::StreamExt;
use reqwest::Client;
use sha1::{Digest, Sha1};
use std::path::Path;
use std::time::Instant;
use tokio::fs::{create_dir_all, File};
use tokio::io::AsyncWriteExt;

/// Build the shared HTTP client used for a whole engine run
pub fn build_client() -> Result<Client> {
    let client = Client::builder()
        .pool_max_idle_per_host(8)
        .tcp_keepalive(Some(std::time::Duration::from_secs(30)))
        .timeout(request_timeout())
        .build()?;
    Ok(client)
}

/// Production fetcher: streams the response body straight to disk
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ArtifactFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, task: &'a DownloadTask) -> BoxFuture<'a, Result<()>> {
        Box::pin(download_to_path(
            &self.client,
            &task.url,
            &task.save_path,
            task.expected_size,
            task.expected_sha1.as_deref(),
        ))
    }
}

/// Download a file to a path, single attempt.
///
/// The body goes to `<name>.part` next to the destination and is renamed into
/// place only after size and SHA1 checks pass.
pub async fn download_to_path(
    client: &Client,
    url: &str,
    path: &Path,
    expected_size: Option<u64>,
    expected_sha1: Option<&str>,
) -> Result<()> {
    log::debug!("Downloading: {} -> {:?}", url, path);

    if let Some(parent) = path.parent() {
        create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }

    let tmp_name = format!(
        "{}.part",
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("download")
    );
    let tmp_path = path.with_file_name(tmp_name);

    match stream_to_file(client, url, &tmp_path, expected_size, expected_sha1).await {
        Ok(()) => {
            tokio::fs::rename(&tmp_path, path)
                .await
                .with_context(|| format!("Failed to move {:?} into place", tmp_path))?;
            Ok(())
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            Err(e)
        }
    }
}

async fn stream_to_file(
    client: &Client,
    url: &str,
    tmp_path: &Path,
    expected_size: Option<u64>,
    expected_sha1: Option<&str>,
) -> Result<()> {
    let start = Instant::now();
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP error {}: {}", response.status(), url);
    }

    let mut file = File::create(tmp_path)
        .await
        .with_context(|| format!("Failed to create {:?}", tmp_path))?;
    let mut downloaded: u64 = 0;
    let mut hasher = Sha1::new();

    let mut stream = response.bytes_stream();
    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result?;
        file.write_all(&chunk).await?;
        hasher.update(&chunk);
        downloaded += chunk.len() as u64;
    }
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    if let Some(expected) = expected_size {
        if downloaded != expected {
            anyhow::bail!(
                "Size mismatch for {}: expected {} bytes, got {}",
                url,
                expected,
                downloaded
            );
        }
    }

    if let Some(expected) = expected_sha1 {
        let computed = format!("{:x}", hasher.finalize());
        if !computed.eq_ignore_ascii_case(expected) {
            anyhow::bail!(
                "SHA1 mismatch for {}: expected {}, got {}",
                url,
                expected,
                computed
            );
        }
    }

    log::debug!(
        "Downloaded {} ({} bytes in {:.2}s)",
        url,
        downloaded,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Download JSON using an existing Client and deserialize it.
/// `origin` names the document in error messages.
pub async fn download_json_with_client<T: serde::de::DeserializeOwned>(
    client: &Client,
    url: &str,
    origin: &str,
) -> Result<T> {
    log::debug!("Downloading JSON: {}", url);
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP error {}: {}", response.status(), url);
    }

    let bytes = response.bytes().await?;
    parse_remote_json(&bytes, origin)
}

/// Parse a JSON document from the distribution service.
/// A top-level `error` field means the service answered with an error payload.
pub fn parse_remote_json<T: serde::de::DeserializeOwned>(bytes: &[u8], origin: &str) -> Result<T> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| InstallError::malformed(origin, e))?;

    if let Some(error) = value.get("error") {
        let message = value
            .get("errorMessage")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(InstallError::malformed(origin, message).into());
    }

    let parsed = serde_json::from_value(value).map_err(|e| InstallError::malformed(origin, e))?;
    Ok(parsed)
}
