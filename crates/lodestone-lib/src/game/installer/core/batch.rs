use super::traits::ArtifactFetcher;
use crate::game::installer::error::InstallError;
use crate::game::installer::types::{DownloadFailure, DownloadTask, ProgressReporter};
use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;

/// Fixed-size worker pool draining a FIFO queue of download tasks.
///
/// Every task is attempted exactly once. A failed task never cancels the
/// others; once the whole batch has settled the failures are folded into a
/// single `InstallError::AggregateDownloadFailure`.
pub struct BatchDownloader {
    fetcher: Arc<dyn ArtifactFetcher>,
    concurrency: usize,
}

impl BatchDownloader {
    pub fn new(fetcher: Arc<dyn ArtifactFetcher>, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn run(
        &self,
        tasks: Vec<DownloadTask>,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Result<()> {
        let total = tasks.len();
        if total == 0 {
            return Ok(());
        }

        let (tx, rx) = mpsc::unbounded_channel::<(usize, DownloadTask)>();
        for entry in tasks.into_iter().enumerate() {
            // Receiver is alive until the workers exit
            let _ = tx.send(entry);
        }
        drop(tx);

        let queue = Arc::new(Mutex::new(rx));
        let completed = Arc::new(AtomicUsize::new(0));
        let workers = self.concurrency.min(total);
        log::debug!("Starting batch of {} tasks with {} workers", total, workers);

        let mut set = JoinSet::new();
        for _ in 0..workers {
            let queue = queue.clone();
            let fetcher = self.fetcher.clone();
            let reporter = reporter.clone();
            let completed = completed.clone();

            set.spawn(async move {
                let mut failures = Vec::new();
                loop {
                    // Hold the lock only while dequeuing
                    let next = queue.lock().await.recv().await;
                    let Some((index, task)) = next else {
                        break;
                    };

                    let outcome = fetcher.fetch(&task).await;
                    let count = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    reporter.task_settled(index, count, total, outcome.is_ok());

                    if let Err(e) = outcome {
                        log::warn!("Download failed: {} ({})", task.url, e);
                        failures.push(DownloadFailure {
                            index,
                            url: task.url,
                            path: task.save_path,
                            reason: format!("{:#}", e),
                        });
                    } else if count % 50 == 0 || count == total {
                        log::info!("Batch download progress: {}/{}", count, total);
                    }
                }
                failures
            });
        }

        let mut failures = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(mut worker_failures) => failures.append(&mut worker_failures),
                Err(e) => anyhow::bail!("Download worker panicked: {}", e),
            }
        }

        if failures.is_empty() {
            return Ok(());
        }

        failures.sort_by_key(|f| f.index);
        log::error!("{} of {} downloads failed", failures.len(), total);
        Err(InstallError::AggregateDownloadFailure {
            failed: failures.len(),
            total,
            failures,
        }
        .into())
    }
}
