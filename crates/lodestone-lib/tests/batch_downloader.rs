mod common;

use common::{init_logger, MemoryFetcher, RecordingReporter};
use lodestone_lib::game::installer::core::BatchDownloader;
use lodestone_lib::game::DownloadTask;
use lodestone_lib::InstallError;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn bounded_batch_keeps_successes_and_reports_failure() {
    init_logger();
    let tmp = tempfile::tempdir().unwrap();

    let mut fetcher = MemoryFetcher::new().with_delay(Duration::from_millis(25));
    let mut tasks = Vec::new();
    for i in 1..=5 {
        let url = format!("http://files.test/{}", i);
        fetcher = if i == 3 {
            fetcher.failing(&url)
        } else {
            fetcher.serve(&url, format!("body {}", i).as_bytes())
        };
        tasks.push(DownloadTask::new(url, tmp.path().join(format!("out/{}.bin", i))));
    }
    let fetcher = Arc::new(fetcher);
    let reporter = Arc::new(RecordingReporter::default());

    let err = BatchDownloader::new(fetcher.clone(), 2)
        .run(tasks, reporter.clone())
        .await
        .unwrap_err();

    assert!(fetcher.max_in_flight() <= 2, "more than 2 tasks in flight");
    assert_eq!(fetcher.requests().len(), 5, "each task attempted exactly once");

    for i in [1, 2, 4, 5] {
        let body = std::fs::read(tmp.path().join(format!("out/{}.bin", i))).unwrap();
        assert_eq!(body, format!("body {}", i).as_bytes());
    }
    assert!(!tmp.path().join("out/3.bin").exists());

    match err.downcast_ref::<InstallError>() {
        Some(InstallError::AggregateDownloadFailure {
            failed,
            total,
            failures,
        }) => {
            assert_eq!(*failed, 1);
            assert_eq!(*total, 5);
            assert_eq!(failures[0].index, 2);
            assert_eq!(failures[0].url, "http://files.test/3");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let settled = reporter.settled.lock().unwrap();
    assert_eq!(settled.len(), 5);
    let mut completed: Vec<usize> = settled.iter().map(|s| s.1).collect();
    completed.sort();
    assert_eq!(completed, vec![1, 2, 3, 4, 5]);
    assert_eq!(settled.iter().filter(|s| !s.2).count(), 1);
}

#[tokio::test]
async fn concurrency_limit_is_reached_but_not_exceeded() {
    let tmp = tempfile::tempdir().unwrap();
    let mut fetcher = MemoryFetcher::new().with_delay(Duration::from_millis(20));
    let mut tasks = Vec::new();
    for i in 0..12 {
        let url = format!("http://files.test/{}", i);
        fetcher = fetcher.serve(&url, b"x");
        tasks.push(DownloadTask::new(url, tmp.path().join(i.to_string())));
    }
    let fetcher = Arc::new(fetcher);

    BatchDownloader::new(fetcher.clone(), 3)
        .run(tasks, Arc::new(RecordingReporter::default()))
        .await
        .unwrap();

    assert_eq!(fetcher.max_in_flight(), 3);
}
