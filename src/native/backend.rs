use super::emitter::EventEmitter;
use crate::error::NativeError;
use crate::options::{CallConvention, NativeCallArgs};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Native recorder surface
///
/// Calls resolve with the recording path, as the platform recorders do.
/// Progress and finished notifications are emitted on `events()` under
/// `recordingProgress` / `recordingFinished`.
#[async_trait::async_trait]
pub trait RecorderBackend: Send + Sync {
    /// Configure the recorder for one file
    async fn prepare(&self, args: NativeCallArgs) -> Result<String, NativeError>;

    async fn start(&self) -> Result<String, NativeError>;

    async fn pause(&self) -> Result<String, NativeError>;

    async fn resume(&self) -> Result<String, NativeError>;

    async fn stop(&self) -> Result<String, NativeError>;

    /// Current microphone permission, without prompting
    async fn check_authorization(&self) -> bool;

    /// Prompt for microphone permission (platforms that own the prompt)
    async fn request_authorization(&self) -> bool;

    fn events(&self) -> Arc<EventEmitter>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Native player surface
///
/// Emits `playerProgress` ticks while playing and `playerFinished` on
/// natural completion.
#[async_trait::async_trait]
pub trait PlayerBackend: Send + Sync {
    /// Play a local file
    async fn play(&self, args: NativeCallArgs) -> Result<(), NativeError>;

    /// Play a remote source
    async fn play_with_url(&self, args: NativeCallArgs) -> Result<(), NativeError>;

    async fn pause(&self) -> Result<String, NativeError>;

    async fn unpause(&self) -> Result<String, NativeError>;

    async fn stop(&self) -> Result<String, NativeError>;

    async fn skip_to_seconds(&self, seconds: f64) -> Result<(), NativeError>;

    async fn set_current_time(&self, seconds: f64) -> Result<(), NativeError>;

    /// Duration of the loaded source in seconds
    async fn get_duration(&self) -> Result<f64, NativeError>;

    /// Duration of a file without loading it into the player
    async fn get_duration_from_path(&self, path: &str) -> Result<f64, NativeError>;

    /// Keys of the output routes usable right now
    async fn get_outputs(&self) -> Result<Vec<String>, NativeError>;

    fn events(&self) -> Arc<EventEmitter>;

    fn name(&self) -> &str;
}

/// Answer from a host permission prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionResult {
    Granted,
    Denied,
    NeverAskAgain,
}

/// Host facility for runtime permission prompts
#[async_trait::async_trait]
pub trait PermissionRequester: Send + Sync {
    async fn request_record_audio(&self) -> PermissionResult;
}

/// Where a recording permission prompt is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationRoute {
    /// The recorder surface prompts itself
    Recorder,
    /// A generic host permission facility prompts
    PermissionFacility,
}

/// Deployment targets with known native conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformTarget {
    #[default]
    Ios,
    Android,
}

/// Capabilities of the active native surface, chosen once at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformCapabilities {
    pub convention: CallConvention,
    pub authorization: AuthorizationRoute,
}

impl PlatformCapabilities {
    pub fn ios() -> Self {
        Self {
            convention: CallConvention::Positional,
            authorization: AuthorizationRoute::Recorder,
        }
    }

    pub fn android() -> Self {
        Self {
            convention: CallConvention::OptionRecord,
            authorization: AuthorizationRoute::PermissionFacility,
        }
    }

    pub fn for_target(target: PlatformTarget) -> Self {
        match target {
            PlatformTarget::Ios => Self::ios(),
            PlatformTarget::Android => Self::android(),
        }
    }
}
