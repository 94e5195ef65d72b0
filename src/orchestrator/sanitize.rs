//! Sanitize orchestration
//!
//! Hands one file plus the detection list the UI is displaying to the
//! sanitizer engine, which writes a remediated copy next to its input.

use std::path::Path;

use serde_json::Value;

use crate::engine::{EngineKind, EngineLocator, ProcessRunner, StagedFile, StagingArea, ENCODING_ENV};
use crate::error::EngineError;
use crate::models::{SanitizeRequest, SanitizeResult};
use crate::utils::env::STAGING_PREFIX;
use crate::utils::AppConfig;

/// Name used to stage bytes sent without a filename
const UNNAMED_UPLOAD: &str = "upload";

pub struct SanitizeOrchestrator {
    locator: EngineLocator,
    staging: StagingArea,
    runner: ProcessRunner,
}

impl SanitizeOrchestrator {
    pub fn new(config: &AppConfig, locator: EngineLocator) -> Self {
        Self {
            locator,
            staging: StagingArea::new(&config.staging_dir, STAGING_PREFIX),
            runner: ProcessRunner::new(config.engine_timeout),
        }
    }

    /// Sanitize one file; failures come back as `ok: false`
    pub async fn sanitize(&self, request: &SanitizeRequest) -> SanitizeResult {
        match self.try_sanitize(request).await {
            Ok(result) => result,
            Err(e) => {
                log::error!("[sanitize] {} failed: {}", request.filename, e);
                SanitizeResult::failure(e)
            }
        }
    }

    async fn try_sanitize(&self, request: &SanitizeRequest) -> Result<SanitizeResult, EngineError> {
        let source = self.source_for(request)?;

        let outcome = self.invoke(&source, request).await;
        // A persisted source belongs to the caller; only staged bytes go away
        source.release();

        let result = parse_sanitize_output(&outcome?)?;
        log::info!(
            "[sanitize] {} -> {} (patched={})",
            request.filename,
            result.output_path.as_deref().unwrap_or_default(),
            result.patched.unwrap_or_default()
        );
        Ok(result)
    }

    /// Pick the file the engine reads: the persisted path if given, else staged bytes
    fn source_for(&self, request: &SanitizeRequest) -> Result<StagedFile, EngineError> {
        if let Some(path) = request.persisted_path() {
            let path = Path::new(path);
            if !path.is_file() {
                return Err(EngineError::Validation(format!(
                    "Source file not found: {}",
                    path.display()
                )));
            }
            return Ok(StagedFile::external(path, &request.filename));
        }

        match &request.bytes {
            Some(bytes) => {
                let name = if request.filename.trim().is_empty() {
                    UNNAMED_UPLOAD
                } else {
                    request.filename.as_str()
                };
                self.staging.stage(name, bytes)
            }
            None => Err(EngineError::Validation(
                "No srcPath or bytes provided".to_string(),
            )),
        }
    }

    async fn invoke(&self, source: &StagedFile, request: &SanitizeRequest) -> Result<Vec<u8>, EngineError> {
        let engine = self.locator.locate(EngineKind::Sanitizer).await?;
        let detections = serde_json::to_vec(&request.detections)?;

        let mut invocation = engine
            .invocation()
            .arg("--in")
            .arg(source.path().to_string_lossy().into_owned())
            .arg("--stdin")
            .stdin(detections)
            .env(ENCODING_ENV.0, ENCODING_ENV.1);

        if request.ai_disabled {
            invocation = invocation.arg("--no-ai");
        }
        if let Some(mask) = request.mask_token() {
            invocation = invocation.arg("--mask").arg(mask);
        }

        self.runner.run(&invocation).await
    }
}

/// Read the sanitizer's single JSON object
///
/// Unlike scanning there is no lenient fallback: without an output path
/// there is nothing to save.
pub fn parse_sanitize_output(stdout: &[u8]) -> Result<SanitizeResult, EngineError> {
    let payload: Value = serde_json::from_slice(stdout)?;

    let output_path = ["outPath", "outputPath"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .filter(|p| !p.is_empty())
        .ok_or(EngineError::IncompleteOutput("outPath"))?;

    let patched = match payload.get("patched") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(count)) => count.as_f64().is_some_and(|n| n > 0.0),
        _ => false,
    };

    let report = payload.get("report").filter(|r| !r.is_null()).cloned();

    Ok(SanitizeResult::success(output_path.to_string(), patched, report))
}
