//! Request/response channels between the UI and the host
//!
//! The UI is untrusted. A channel name is turned into an [`InvokeChannel`]
//! exactly once, here; everything past this point matches on the enum, so an
//! unknown operation cannot reach an orchestrator.

use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChannelError;
use crate::models::{SanitizeRequest, SanitizeResult, ScanRequestItem, ScanResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokeChannel {
    ScanFiles,
    ScanFile,
    SanitizeFile,
    PickDirectory,
    SaveSanitizedTo,
    OpenPath,
    Ping,
}

impl InvokeChannel {
    pub const ALL: [InvokeChannel; 7] = [
        InvokeChannel::ScanFiles,
        InvokeChannel::ScanFile,
        InvokeChannel::SanitizeFile,
        InvokeChannel::PickDirectory,
        InvokeChannel::SaveSanitizedTo,
        InvokeChannel::OpenPath,
        InvokeChannel::Ping,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvokeChannel::ScanFiles => "scan-files",
            InvokeChannel::ScanFile => "scan-file",
            InvokeChannel::SanitizeFile => "sanitize-file",
            InvokeChannel::PickDirectory => "pick-directory",
            InvokeChannel::SaveSanitizedTo => "save-sanitized-to",
            InvokeChannel::OpenPath => "open-path",
            InvokeChannel::Ping => "ping",
        }
    }
}

impl FromStr for InvokeChannel {
    type Err = ChannelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InvokeChannel::ALL
            .into_iter()
            .find(|channel| channel.as_str() == s)
            .ok_or_else(|| ChannelError::UnknownChannel(s.to_string()))
    }
}

/// Arguments of `save-sanitized-to`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveTarget {
    pub src: String,
    pub dir: String,
}

/// `open-path` accepts a bare string or `{ "path": ... }`
#[derive(Deserialize)]
#[serde(untagged)]
enum PathArg {
    Bare(String),
    Object { path: String },
}

/// A decoded request, one variant per channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    ScanFiles(Vec<ScanRequestItem>),
    ScanFile(ScanRequestItem),
    SanitizeFile(SanitizeRequest),
    PickDirectory,
    SaveSanitizedTo(SaveTarget),
    OpenPath(String),
    Ping,
}

impl Request {
    /// Validate the channel name, then the payload shape for that channel
    ///
    /// # Errors
    /// * `ChannelError::UnknownChannel` - name outside the fixed set
    /// * `ChannelError::InvalidPayload` - payload does not fit the channel
    pub fn decode(channel: &str, payload: Option<Value>) -> Result<Self, ChannelError> {
        let channel: InvokeChannel = channel.parse()?;
        let payload = payload.unwrap_or(Value::Null);

        let request = match channel {
            InvokeChannel::ScanFiles => Request::ScanFiles(parse(channel, payload)?),
            InvokeChannel::ScanFile => Request::ScanFile(parse(channel, payload)?),
            InvokeChannel::SanitizeFile => Request::SanitizeFile(parse(channel, payload)?),
            InvokeChannel::PickDirectory => Request::PickDirectory,
            InvokeChannel::SaveSanitizedTo => Request::SaveSanitizedTo(parse(channel, payload)?),
            InvokeChannel::OpenPath => {
                let path = match parse::<PathArg>(channel, payload)? {
                    PathArg::Bare(path) | PathArg::Object { path } => path,
                };
                Request::OpenPath(path)
            }
            InvokeChannel::Ping => Request::Ping,
        };

        Ok(request)
    }

    pub fn channel(&self) -> InvokeChannel {
        match self {
            Request::ScanFiles(_) => InvokeChannel::ScanFiles,
            Request::ScanFile(_) => InvokeChannel::ScanFile,
            Request::SanitizeFile(_) => InvokeChannel::SanitizeFile,
            Request::PickDirectory => InvokeChannel::PickDirectory,
            Request::SaveSanitizedTo(_) => InvokeChannel::SaveSanitizedTo,
            Request::OpenPath(_) => InvokeChannel::OpenPath,
            Request::Ping => InvokeChannel::Ping,
        }
    }
}

fn parse<T: DeserializeOwned>(channel: InvokeChannel, payload: Value) -> Result<T, ChannelError> {
    serde_json::from_value(payload).map_err(|e| ChannelError::InvalidPayload {
        channel: channel.as_str().to_string(),
        reason: e.to_string(),
    })
}

/// What a request channel resolves to on the UI side
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Response {
    ScanResults(Vec<ScanResult>),
    ScanResult(ScanResult),
    Sanitize(SanitizeResult),
    /// `null` when the dialog was dismissed or the copy was refused
    Path(Option<String>),
    Opened(bool),
    Pong(&'static str),
}

impl Response {
    pub const PONG: &'static str = "pong";
}
