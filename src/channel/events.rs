//! Push events from the host to the UI
//!
//! Only three push channels exist. A subscription naming anything else is
//! logged and ignored; it never errors, since subscribing is fire-and-forget.

use std::str::FromStr;

use serde::Serialize;
use tauri::{AppHandle, Emitter, Runtime};

use crate::models::{CompletionEvent, ProgressEvent, ResultEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushChannel {
    Progress,
    Result,
    Complete,
}

impl PushChannel {
    pub const ALL: [PushChannel; 3] = [PushChannel::Progress, PushChannel::Result, PushChannel::Complete];

    pub fn as_str(&self) -> &'static str {
        match self {
            PushChannel::Progress => "scan-progress",
            PushChannel::Result => "scan-result",
            PushChannel::Complete => "scan-complete",
        }
    }
}

impl FromStr for PushChannel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PushChannel::ALL
            .into_iter()
            .find(|channel| channel.as_str() == s)
            .ok_or(())
    }
}

/// Validate a subscription request
///
/// Returns `None` for unknown channels, after logging them.
pub fn subscribe(channel: &str) -> Option<PushChannel> {
    match channel.parse::<PushChannel>() {
        Ok(known) => Some(known),
        Err(()) => {
            log::warn!("[channel] blocked event channel: {}", channel);
            None
        }
    }
}

/// One push notification with its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    Progress(ProgressEvent),
    Result(ResultEvent),
    Complete(CompletionEvent),
}

impl PushEvent {
    pub fn channel(&self) -> PushChannel {
        match self {
            PushEvent::Progress(_) => PushChannel::Progress,
            PushEvent::Result(_) => PushChannel::Result,
            PushEvent::Complete(_) => PushChannel::Complete,
        }
    }
}

/// Where the orchestrators deliver push events
pub trait EventSink: Send + Sync {
    /// # Errors
    /// Returns a description if the event could not be delivered
    fn emit(&self, event: PushEvent) -> Result<(), String>;
}

/// Delivers push events to the webview that issued the request
pub struct WebviewSink<R: Runtime> {
    app: AppHandle<R>,
    label: String,
}

impl<R: Runtime> WebviewSink<R> {
    pub fn new(app: AppHandle<R>, label: impl Into<String>) -> Self {
        Self {
            app,
            label: label.into(),
        }
    }

    fn send<S: Serialize + Clone>(&self, channel: PushChannel, payload: S) -> Result<(), String> {
        self.app
            .emit_to(self.label.as_str(), channel.as_str(), payload)
            .map_err(|e| format!("Failed to emit {}: {}", channel.as_str(), e))
    }
}

impl<R: Runtime> EventSink for WebviewSink<R> {
    fn emit(&self, event: PushEvent) -> Result<(), String> {
        let channel = event.channel();
        match event {
            PushEvent::Progress(payload) => self.send(channel, payload),
            PushEvent::Result(payload) => self.send(channel, payload),
            PushEvent::Complete(payload) => self.send(channel, payload),
        }
    }
}
