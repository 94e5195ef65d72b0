//! Native desktop surfaces used by the channel layer
//!
//! Kept behind a trait so the dispatcher can be driven without a window.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tauri::{AppHandle, Runtime};
use tauri_plugin_dialog::DialogExt;

#[async_trait]
pub trait DesktopShell: Send + Sync {
    /// Ask the user for a directory; `None` if the dialog was dismissed
    async fn pick_directory(&self) -> Option<PathBuf>;

    /// Show `path` in the platform file manager
    ///
    /// # Errors
    /// Returns a description if the platform refused
    fn open_path(&self, path: &Path) -> Result<(), String>;
}

pub struct TauriShell<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> TauriShell<R> {
    pub fn new(app: AppHandle<R>) -> Self {
        Self { app }
    }
}

#[async_trait]
impl<R: Runtime> DesktopShell for TauriShell<R> {
    async fn pick_directory(&self) -> Option<PathBuf> {
        let (tx, rx) = tokio::sync::oneshot::channel();

        self.app.dialog().file().pick_folder(move |folder| {
            // The receiver may be gone if the request was dropped
            let _ = tx.send(folder);
        });

        match rx.await {
            Ok(Some(folder)) => match folder.into_path() {
                Ok(path) => Some(path),
                Err(e) => {
                    log::warn!("[shell] picked folder is not a local path: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(_) => {
                log::warn!("[shell] folder dialog closed without answer");
                None
            }
        }
    }

    fn open_path(&self, path: &Path) -> Result<(), String> {
        // Directories are opened, files are revealed in their folder
        let opened = if path.is_dir() {
            tauri_plugin_opener::open_path(path, None::<&str>)
        } else {
            tauri_plugin_opener::reveal_item_in_dir(path)
        };

        opened.map_err(|e| format!("Failed to open {}: {}", path.display(), e))
    }
}
