use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Periodic progress tick from the native surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressData {
    /// Seconds since the session started (excluding paused time)
    pub current_time: f64,

    /// Average power in dBFS, only present with metering enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_metering: Option<f64>,

    /// Peak power in dBFS, only present with metering enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_peak_metering: Option<f64>,
}

/// Terminal status carried by a finished notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FinishStatus {
    Ok,
    Error(String),
}

impl From<String> for FinishStatus {
    fn from(value: String) -> Self {
        if value == "OK" {
            Self::Ok
        } else {
            Self::Error(value)
        }
    }
}

impl From<FinishStatus> for String {
    fn from(status: FinishStatus) -> Self {
        match status {
            FinishStatus::Ok => "OK".to_string(),
            FinishStatus::Error(s) => s,
        }
    }
}

/// Terminal notification for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedData {
    pub status: FinishStatus,

    /// `file://` reference to the recording (recorder only)
    #[serde(rename = "audioFileURL", default, skip_serializing_if = "Option::is_none")]
    pub audio_file_url: Option<String>,

    #[serde(rename = "audioFileSize", default, skip_serializing_if = "Option::is_none")]
    pub audio_file_size: Option<u64>,

    /// File contents, only when `IncludeBase64` was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
}

impl FinishedData {
    pub fn ok() -> Self {
        Self {
            status: FinishStatus::Ok,
            audio_file_url: None,
            audio_file_size: None,
            base64: None,
        }
    }

    /// Payload for a recording whose native stop returned `path`
    pub fn recorded(path: &str) -> Self {
        Self {
            audio_file_url: Some(format!("file://{}", path)),
            ..Self::ok()
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: FinishStatus::Error(reason.into()),
            ..Self::ok()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == FinishStatus::Ok
    }
}

/// Callback slot; the default slot does nothing
pub struct Handler<T>(Arc<dyn Fn(&T) + Send + Sync>);

impl<T> Handler<T> {
    pub fn new(f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn noop() -> Self {
        Self(Arc::new(|_| {}))
    }

    pub fn call(&self, value: &T) {
        (self.0)(value)
    }
}

impl<T> Clone for Handler<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Default for Handler<T> {
    fn default() -> Self {
        Self::noop()
    }
}

impl<T> fmt::Debug for Handler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler")
    }
}

/// The two callback slots a session kind exposes
#[derive(Debug, Clone, Default)]
pub struct SessionHandlers {
    pub on_progress: Handler<ProgressData>,
    pub on_finished: Handler<FinishedData>,
}

impl SessionHandlers {
    pub fn new(
        on_progress: impl Fn(&ProgressData) + Send + Sync + 'static,
        on_finished: impl Fn(&FinishedData) + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_progress: Handler::new(on_progress),
            on_finished: Handler::new(on_finished),
        }
    }
}
