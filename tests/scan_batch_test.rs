//! Scan batches against the fake scan engine
//!
//! Covers event ordering, per-item failure isolation, and cleanup of staged
//! uploads on every path.

#![cfg(unix)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{BrokenSink, FakeEngines, RecordingSink};
use texnel::channel::PushEvent;
use texnel::engine::{EngineLocator, RuntimeResolver};
use texnel::models::{ProgressEvent, ScanRequestItem};
use texnel::orchestrator::ScanOrchestrator;

fn orchestrator(engines: &FakeEngines) -> ScanOrchestrator {
    let config = engines.config();
    ScanOrchestrator::new(&config, EngineLocator::from_config(&config))
}

fn items(names: &[&str]) -> Vec<ScanRequestItem> {
    names
        .iter()
        .map(|name| ScanRequestItem::new(*name, format!("bytes of {}", name).into_bytes()))
        .collect()
}

#[tokio::test]
async fn test_clean_and_flagged_files() {
    let engines = FakeEngines::install();
    let sink = RecordingSink::default();

    let results = orchestrator(&engines)
        .scan_batch(items(&["clean.hwp", "flagged.docx"]), &sink)
        .await;

    assert_eq!(results.len(), 2);

    assert_eq!(results[0].filename, "clean.hwp");
    assert!(results[0].detections.is_empty());
    assert!(!results[0].has_detection);
    assert!(results[0].error.is_none());

    let flagged = &results[1];
    assert_eq!(flagged.filename, "flagged.docx");
    assert!(flagged.has_detection);
    assert_eq!(flagged.detections.len(), 2);
    assert_eq!(flagged.detections[0].id, 1);
    assert_eq!(flagged.detections[0].kind, "eps");
    assert_eq!(flagged.detections[0].keyword, "%!PS exec");
    assert_eq!(flagged.detections[0].summary, "PostScript payload");
    assert_eq!(flagged.detections[1].id, 7);
    assert_eq!(flagged.detections[1].keyword, "Package");
    assert_eq!(flagged.detections[1].summary, "embedded object");

    let events = sink.events();
    assert_eq!(events.len(), 5);
    match (&events[0], &events[1]) {
        (PushEvent::Result(result), PushEvent::Progress(progress)) => {
            assert_eq!(result.name, "clean.hwp");
            assert_eq!(
                *progress,
                ProgressEvent {
                    done: 1,
                    total: 2,
                    name: Some("clean.hwp".to_string())
                }
            );
        }
        other => panic!("unexpected events: {:?}", other),
    }
    match &events[4] {
        PushEvent::Complete(complete) => {
            assert_eq!(complete.total, 2);
            assert_eq!(complete.results, results);
        }
        other => panic!("expected completion, got {:?}", other),
    }

    assert!(engines.staged_leftovers().is_empty());
}

#[tokio::test]
async fn test_progress_is_monotonic() {
    let engines = FakeEngines::install();
    let sink = RecordingSink::default();
    let names = ["a.hwp", "b.hwp", "c.docx", "d.docx"];

    orchestrator(&engines).scan_batch(items(&names), &sink).await;

    let done: Vec<usize> = sink
        .events()
        .iter()
        .filter_map(|event| match event {
            PushEvent::Progress(p) => Some(p.done),
            _ => None,
        })
        .collect();
    assert_eq!(done, vec![1, 2, 3, 4]);

    let completions = sink
        .events()
        .iter()
        .filter(|event| matches!(event, PushEvent::Complete(_)))
        .count();
    assert_eq!(completions, 1);
}

#[tokio::test]
async fn test_crash_is_isolated_to_its_item() {
    let engines = FakeEngines::install();
    let sink = RecordingSink::default();

    let results = orchestrator(&engines)
        .scan_batch(items(&["first.hwp", "crash.hwp", "last.docx"]), &sink)
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].error.is_none());
    assert!(results[2].error.is_none());

    let crashed = &results[1];
    assert_eq!(crashed.filename, "crash.hwp");
    assert!(crashed.detections.is_empty());
    let error = crashed.error.as_deref().unwrap();
    assert!(error.contains("rc=3"), "error was {}", error);
    assert!(error.contains("detector exploded"));

    // Each staged file existed during its call and is gone afterwards
    let seen = engines.seen_paths();
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|path| !path.exists()));
    assert!(engines.staged_leftovers().is_empty());
}

#[tokio::test]
async fn test_unreadable_output_degrades_with_diagnostic() {
    let engines = FakeEngines::install();
    let sink = RecordingSink::default();

    let results = orchestrator(&engines)
        .scan_batch(items(&["garbage.hwp", "silent.docx"]), &sink)
        .await;

    for (result, name) in results.iter().zip(["garbage.hwp", "silent.docx"]) {
        assert_eq!(result.filename, name);
        assert!(result.detections.is_empty());
        assert!(result.error.is_none());
        assert!(result.diagnostic.is_some());
    }
}

#[tokio::test]
async fn test_engine_reported_error_is_surfaced() {
    let engines = FakeEngines::install();

    let result = orchestrator(&engines)
        .scan_file(&ScanRequestItem::new("unsupported.txt", b"x".to_vec()))
        .await;

    assert_eq!(result.error.as_deref(), Some("unsupported_extension"));
}

#[tokio::test]
async fn test_engine_sees_original_name_and_encoding() {
    let engines = FakeEngines::install();

    let result = orchestrator(&engines)
        .scan_file(&ScanRequestItem::new("Quarterly Report.HWP", b"x".to_vec()))
        .await;

    assert_eq!(result.filename, "Quarterly Report.HWP");
    assert_eq!(engines.read_log("encoding.log"), "utf-8");
    assert_eq!(engines.read_log("verbose.log"), "1");

    let seen = engines.seen_paths();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].starts_with(&engines.staging_dir));
    assert_eq!(seen[0].extension().unwrap(), "hwp");
}

#[tokio::test]
async fn test_timeout_is_recorded_and_batch_continues() {
    let engines = FakeEngines::install();
    let config = engines.config().with_timeout(Some(Duration::from_millis(500)));
    let orchestrator = ScanOrchestrator::new(&config, EngineLocator::from_config(&config));
    let sink = RecordingSink::default();

    let results = orchestrator
        .scan_batch(items(&["hang.hwp", "after.hwp"]), &sink)
        .await;

    assert!(results[0].error.as_deref().unwrap().contains("did not finish"));
    assert!(results[1].error.is_none());
    assert!(engines.staged_leftovers().is_empty());
}

#[tokio::test]
async fn test_no_runtime_fails_every_item() {
    let engines = FakeEngines::install();
    std::fs::remove_file(texnel::engine::resolver::bundled_runtime_path(&engines.resource_dir)).unwrap();

    let config = engines.config();
    let resolver = RuntimeResolver::new(&config).with_candidates(Vec::new());
    let orchestrator = ScanOrchestrator::new(&config, EngineLocator::new(resolver, &config.resource_dir));
    let sink = RecordingSink::default();

    let results = orchestrator
        .scan_batch(items(&["a.hwp", "b.docx"]), &sink)
        .await;

    assert_eq!(results.len(), 2);
    for result in &results {
        let error = result.error.as_deref().unwrap();
        assert!(error.contains("Python executable not found"));
        assert!(error.contains("TEXNEL_IT_UNSET_PRIMARY"));
    }
    assert!(matches!(sink.events().last(), Some(PushEvent::Complete(c)) if c.results.len() == 2));
    assert!(engines.seen_paths().is_empty());
    assert!(engines.staged_leftovers().is_empty());
}

#[tokio::test]
async fn test_broken_transport_returns_partial_results() {
    let engines = FakeEngines::install();
    // First item's result and progress get through, then the webview vanishes
    let sink = BrokenSink::after(2);

    let results = orchestrator(&engines)
        .scan_batch(items(&["a.hwp", "b.hwp", "c.hwp"]), &sink)
        .await;

    assert_eq!(results.len(), 1);
    assert_eq!(engines.seen_paths().len(), 2);
    assert_eq!(sink.events().len(), 2);
    assert!(engines.staged_leftovers().is_empty());
}

#[tokio::test]
async fn test_concurrent_batches_do_not_interleave() {
    let engines = FakeEngines::install();
    let orchestrator = Arc::new(orchestrator(&engines));
    let first = Arc::new(RecordingSink::default());
    let second = Arc::new(RecordingSink::default());

    let a = {
        let orchestrator = Arc::clone(&orchestrator);
        let sink = Arc::clone(&first);
        tokio::spawn(async move { orchestrator.scan_batch(items(&["a1.hwp", "a2.hwp"]), sink.as_ref()).await })
    };
    let b = {
        let orchestrator = Arc::clone(&orchestrator);
        let sink = Arc::clone(&second);
        tokio::spawn(async move { orchestrator.scan_batch(items(&["b1.hwp", "b2.hwp"]), sink.as_ref()).await })
    };

    let (a, b) = (a.await.unwrap(), b.await.unwrap());
    assert_eq!(a.len(), 2);
    assert_eq!(b.len(), 2);

    // Batches run one after the other, never interleaved
    let seen = engines.seen_names();
    assert!(
        seen == ["a1.hwp", "a2.hwp", "b1.hwp", "b2.hwp"] || seen == ["b1.hwp", "b2.hwp", "a1.hwp", "a2.hwp"],
        "interleaved: {:?}",
        seen
    );
    assert_eq!(first.events().len(), 5);
    assert_eq!(second.events().len(), 5);
}
