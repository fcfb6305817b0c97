pub mod config;
pub mod error;
pub mod http;
pub mod native;
pub mod options;
pub mod session;
pub mod subscription;

pub use config::Config;
pub use error::{BridgeError, BridgeResult, NativeError};
pub use http::{create_router, AppState};
pub use native::{
    EventEmitter, EventKind, PermissionRequester, PlatformCapabilities, PlatformTarget,
    PlayerBackend, RecorderBackend, SimulatedPlayer, SimulatedRecorder,
};
pub use options::{
    CallConvention, NativeCallArgs, OptionNormalizer, OutputDescriptor, OutputRoute,
    PlaybackOptions, PlaybackSettings, RecordingOptions, RecordingSettings,
};
pub use session::{
    AudioBridge, FinishStatus, FinishedData, PlayerSession, ProgressData, RecorderSession,
    SessionHandlers, SessionKind, SessionState, SessionStatus,
};
pub use subscription::SubscriptionManager;
