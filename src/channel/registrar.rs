//! One-time wiring of the host
//!
//! `Registrar::install` consumes the registrar, so plugins, managed state and
//! the invoke handler are registered exactly once per builder.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tauri::{Builder, Manager, Runtime};
use tauri_plugin_log::{Target, TargetKind};

use super::dispatcher::Dispatcher;
use super::shell::TauriShell;
use crate::commands;
use crate::engine::{EngineKind, StagingArea};
use crate::utils::env::{dev_resource_dir, STAGING_PREFIX};
use crate::utils::AppConfig;

#[derive(Debug, Default)]
pub struct Registrar {
    config: Option<AppConfig>,
}

impl Registrar {
    /// Configuration is read from the environment during setup
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed configuration instead of the environment
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config: Some(config),
        }
    }

    pub fn install<R: Runtime>(self, builder: Builder<R>) -> Builder<R> {
        let fixed = self.config;

        builder
            .plugin(log_plugin())
            .plugin(tauri_plugin_dialog::init())
            .plugin(tauri_plugin_opener::init())
            .setup(move |app| {
                let config = match fixed {
                    Some(config) => config,
                    None => AppConfig::from_env(&default_resource_dir(app.path().resource_dir().ok()))?,
                };

                log::info!(
                    "[texnel] resources={} staging={} timeout={:?}",
                    config.resource_dir.display(),
                    config.staging_dir.display(),
                    config.engine_timeout
                );

                StagingArea::new(&config.staging_dir, STAGING_PREFIX).sweep_stale_outputs();

                let shell = Arc::new(TauriShell::new(app.handle().clone()));
                app.manage(Dispatcher::from_config(&config, shell));
                Ok(())
            })
            .invoke_handler(tauri::generate_handler![
                commands::ipc::ipc_invoke,
                commands::ipc::ipc_subscribe,
            ])
    }
}

fn log_plugin<R: Runtime>() -> tauri::plugin::TauriPlugin<R> {
    let builder = tauri_plugin_log::Builder::new()
        .targets([
            Target::new(TargetKind::Stdout),
            Target::new(TargetKind::Webview),
        ])
        .level(log::LevelFilter::Info);

    #[cfg(debug_assertions)]
    let builder = builder.level_for("texnel", log::LevelFilter::Debug);

    builder.build()
}

/// Packaged resources when they hold the engines, the source tree otherwise
fn default_resource_dir(packaged: Option<PathBuf>) -> PathBuf {
    packaged
        .filter(|dir| holds_engines(dir))
        .unwrap_or_else(dev_resource_dir)
}

fn holds_engines(dir: &Path) -> bool {
    dir.join(EngineKind::Scanner.entry_point()[0]).is_dir()
}
