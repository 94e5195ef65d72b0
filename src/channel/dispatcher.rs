//! Routing of decoded requests to the orchestrators
//!
//! No business logic lives here: every arm forwards to exactly one
//! collaborator and wraps its answer.

use std::path::Path;
use std::sync::Arc;

use super::events::EventSink;
use super::request::{Request, Response};
use super::shell::DesktopShell;
use crate::engine::EngineLocator;
use crate::error::ChannelError;
use crate::export;
use crate::orchestrator::{SanitizeOrchestrator, ScanOrchestrator};
use crate::utils::AppConfig;

pub struct Dispatcher {
    scan: ScanOrchestrator,
    sanitize: SanitizeOrchestrator,
    shell: Arc<dyn DesktopShell>,
}

impl Dispatcher {
    pub fn new(scan: ScanOrchestrator, sanitize: SanitizeOrchestrator, shell: Arc<dyn DesktopShell>) -> Self {
        Self { scan, sanitize, shell }
    }

    /// Wire both orchestrators to one engine locator built from `config`
    pub fn from_config(config: &AppConfig, shell: Arc<dyn DesktopShell>) -> Self {
        let locator = EngineLocator::from_config(config);
        Self::new(
            ScanOrchestrator::new(config, locator.clone()),
            SanitizeOrchestrator::new(config, locator),
            shell,
        )
    }

    /// Run one request to completion
    ///
    /// Push events produced along the way go to `sink`.
    ///
    /// # Errors
    /// Only `ChannelError::Host` for failures outside any orchestrator
    pub async fn dispatch(&self, request: Request, sink: &dyn EventSink) -> Result<Response, ChannelError> {
        log::debug!("[channel] dispatch {}", request.channel().as_str());

        match request {
            Request::ScanFiles(items) => Ok(Response::ScanResults(self.scan.scan_batch(items, sink).await)),
            Request::ScanFile(item) => Ok(Response::ScanResult(self.scan.scan_file(&item).await)),
            Request::SanitizeFile(request) => Ok(Response::Sanitize(self.sanitize.sanitize(&request).await)),
            Request::PickDirectory => {
                let picked = self.shell.pick_directory().await;
                Ok(Response::Path(picked.map(|p| p.to_string_lossy().into_owned())))
            }
            Request::SaveSanitizedTo(target) => {
                // The copy is blocking file I/O
                let saved = tokio::task::spawn_blocking(move || export::save_sanitized_to(&target.src, &target.dir))
                    .await
                    .map_err(|e| ChannelError::Host(format!("export task failed: {}", e)))?
                    .map_err(|e| ChannelError::Host(format!("{:#}", e)))?;
                Ok(Response::Path(saved.map(|p| p.to_string_lossy().into_owned())))
            }
            Request::OpenPath(path) => Ok(Response::Opened(self.open_path(Path::new(&path)))),
            Request::Ping => Ok(Response::Pong(Response::PONG)),
        }
    }

    fn open_path(&self, path: &Path) -> bool {
        if !path.exists() {
            log::warn!("[channel] open-path on missing path {}", path.display());
            return false;
        }

        match self.shell.open_path(path) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("[channel] {}", e);
                false
            }
        }
    }
}
