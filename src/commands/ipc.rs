//! The two commands the UI can invoke
//!
//! `ipc_invoke` carries every request/response channel; `ipc_subscribe`
//! validates push channel names.

use serde_json::Value;
use tauri::{AppHandle, Runtime, State, Webview};

use crate::channel::{subscribe, Dispatcher, Request, Response, WebviewSink};

/// Run one request channel
///
/// # Arguments
/// * `channel` - One of the fixed request channel names
/// * `payload` - Channel-specific arguments
///
/// Returns: The channel's response, or an error for an unknown channel or
/// malformed payload (nothing is dispatched in that case)
#[tauri::command]
pub async fn ipc_invoke<R: Runtime>(
    app: AppHandle<R>,
    webview: Webview<R>,
    dispatcher: State<'_, Dispatcher>,
    channel: String,
    payload: Option<Value>,
) -> Result<Response, String> {
    let request = Request::decode(&channel, payload).map_err(|e| {
        log::warn!("[channel] rejected {}: {}", channel, e);
        e.to_string()
    })?;

    // Push events go back to the webview that asked
    let sink = WebviewSink::new(app, webview.label());

    dispatcher
        .dispatch(request, &sink)
        .await
        .map_err(|e| e.to_string())
}

/// Check a push channel subscription
///
/// Returns: `true` for a known push channel; unknown names are ignored
#[tauri::command]
pub fn ipc_subscribe(channel: String) -> bool {
    subscribe(&channel).is_some()
}
