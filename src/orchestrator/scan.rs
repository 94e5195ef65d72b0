//! Scan orchestration
//!
//! A batch is processed strictly one item at a time:
//! stage -> invoke engine -> release -> report, then the next item.
//! Per-item failures become data in the item's `ScanResult`; only a failure
//! to deliver events aborts the loop, and even then `scan-complete` is still
//! attempted so the UI always sees a terminal event.

use serde_json::Value;
use tokio::sync::Mutex;

use crate::channel::events::{EventSink, PushEvent};
use crate::engine::{EngineKind, EngineLocator, ProcessRunner, StagedFile, StagingArea, ENCODING_ENV};
use crate::error::EngineError;
use crate::models::{CompletionEvent, ProgressEvent, ResultEvent, ScanRequestItem, ScanResult};
use crate::utils::env::STAGING_PREFIX;
use crate::utils::AppConfig;

/// Diagnostic attached when a cleanly exiting engine printed nothing usable
pub const EMPTY_OUTPUT_DIAGNOSTIC: &str = "engine produced no output";

pub struct ScanOrchestrator {
    locator: EngineLocator,
    staging: StagingArea,
    runner: ProcessRunner,
    verbose: bool,
    /// Held for the whole batch: one batch at a time per orchestrator
    batch_lock: Mutex<()>,
}

impl ScanOrchestrator {
    pub fn new(config: &AppConfig, locator: EngineLocator) -> Self {
        Self {
            locator,
            staging: StagingArea::new(&config.staging_dir, STAGING_PREFIX),
            runner: ProcessRunner::new(config.engine_timeout),
            verbose: config.engine_verbose,
            batch_lock: Mutex::new(()),
        }
    }

    /// Scan a batch, pushing events to `sink` as each item finishes
    ///
    /// Emits one `scan-result` and one `scan-progress` per item, in order, and
    /// exactly one `scan-complete` at the end.
    ///
    /// # Returns
    /// One `ScanResult` per item, or the results gathered so far if event
    /// delivery failed part-way
    pub async fn scan_batch(&self, items: Vec<ScanRequestItem>, sink: &dyn EventSink) -> Vec<ScanResult> {
        let _batch = self.batch_lock.lock().await;

        let total = items.len();
        let mut results = Vec::with_capacity(total);
        log::info!("[scan] batch start total={}", total);

        if let Err(e) = self.run_items(&items, sink, &mut results).await {
            log::error!(
                "[scan] batch aborted after {}/{} items: {}",
                results.len(),
                total,
                e
            );
        }

        let complete = PushEvent::Complete(CompletionEvent {
            total,
            results: results.clone(),
        });
        if let Err(e) = sink.emit(complete) {
            log::warn!("[scan] scan-complete not delivered: {}", e);
        }

        log::info!("[scan] batch done results={}", results.len());
        results
    }

    async fn run_items(
        &self,
        items: &[ScanRequestItem],
        sink: &dyn EventSink,
        results: &mut Vec<ScanResult>,
    ) -> Result<(), String> {
        let total = items.len();

        for (index, item) in items.iter().enumerate() {
            let result = self.scan_file(item).await;

            sink.emit(PushEvent::Result(ResultEvent {
                name: result.filename.clone(),
                result: result.clone(),
            }))?;
            sink.emit(PushEvent::Progress(ProgressEvent {
                done: index + 1,
                total,
                name: Some(item.name.clone()),
            }))?;

            results.push(result);
        }

        Ok(())
    }

    /// Scan a single item; never fails, errors are recorded in the result
    pub async fn scan_file(&self, item: &ScanRequestItem) -> ScanResult {
        match self.try_scan(item).await {
            Ok(result) => {
                log::info!(
                    "[scan] {} -> {} detections",
                    result.filename,
                    result.detections.len()
                );
                result
            }
            Err(e) => {
                log::error!("[scan] {} failed: {}", item.name, e);
                ScanResult::failed(&item.name, e)
            }
        }
    }

    async fn try_scan(&self, item: &ScanRequestItem) -> Result<ScanResult, EngineError> {
        let staged = self.staging.stage(&item.name, &item.bytes)?;

        let outcome = self.invoke(&staged).await;
        // Released before the outcome is inspected, success or not
        staged.release();

        Ok(decode_scan_output(&outcome?, &item.name))
    }

    async fn invoke(&self, staged: &StagedFile) -> Result<Vec<u8>, EngineError> {
        let engine = self.locator.locate(EngineKind::Scanner).await?;

        let mut invocation = engine
            .invocation()
            .arg(staged.engine_token())
            .env(ENCODING_ENV.0, ENCODING_ENV.1);
        if self.verbose {
            invocation = invocation.env("DETECT_LOG", "1").env("DETECT_VERBOSE", "1");
        }

        self.runner.run(&invocation).await
    }
}

/// Turn the stdout of a single-item scan into a result
///
/// Empty or unparsable output degrades to an empty result under the
/// requested name instead of failing; the result carries a `diagnostic` so
/// the degradation stays visible.
pub fn decode_scan_output(stdout: &[u8], requested_name: &str) -> ScanResult {
    let text = String::from_utf8_lossy(stdout);
    let text = text.trim();

    if text.is_empty() {
        log::warn!("[scan] {}: {}", requested_name, EMPTY_OUTPUT_DIAGNOSTIC);
        return ScanResult::new(requested_name, Vec::new()).with_diagnostic(EMPTY_OUTPUT_DIAGNOSTIC);
    }

    match serde_json::from_str::<Value>(text) {
        // A list answer still describes our single item
        Ok(Value::Array(items)) => match items.first() {
            Some(first) => ScanResult::from_engine(first, requested_name),
            None => ScanResult::new(requested_name, Vec::new()).with_diagnostic(EMPTY_OUTPUT_DIAGNOSTIC),
        },
        Ok(payload) => ScanResult::from_engine(&payload, requested_name),
        Err(e) => {
            let decode = EngineError::from(e);
            log::warn!("[scan] {}: {}", requested_name, decode);
            ScanResult::new(requested_name, Vec::new()).with_diagnostic(decode.to_string())
        }
    }
}
