//! Texnel Tauri 2.0 Backend
//!
//! Entry point for the Texnel desktop application. All wiring (plugins,
//! managed state, IPC commands) happens once, in the registrar.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use texnel::channel::Registrar;

fn main() {
    // If this fails, log detailed error and exit gracefully
    if let Err(e) = Registrar::new()
        .install(tauri::Builder::default())
        .run(tauri::generate_context!())
    {
        eprintln!("[texnel] FATAL ERROR: Application failed to start");
        eprintln!("[texnel] Error details: {}", e);
        eprintln!("[texnel] This may be due to:");
        eprintln!("[texnel]   - An invalid TEXNEL_RESOURCE_DIR");
        eprintln!("[texnel]   - Missing system dependencies");
        eprintln!("[texnel]   - Incompatible OS version");
        std::process::exit(1);
    }
}
