use crate::session::{SessionKind, SessionState};
use serde::{Deserialize, Serialize};

/// Rejection reported by the native audio service (code + message, as a
/// rejected native promise carries them)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct NativeError {
    pub code: String,
    pub message: String,
}

impl NativeError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Errors surfaced by the session layer
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    #[error("Invalid option {field}: {reason}")]
    InvalidOption { field: String, reason: String },

    #[error("Native prepare failed: {0}")]
    PrepareFailed(NativeError),

    #[error("A {0} session is already active")]
    AlreadyActive(SessionKind),

    #[error("Cannot {operation} {kind} while {state}")]
    InvalidTransition {
        kind: SessionKind,
        operation: &'static str,
        state: SessionState,
    },

    #[error("Seek to {seconds}s is out of range (duration: {duration:?})")]
    SeekOutOfRange { seconds: f64, duration: Option<f64> },

    #[error("Recording permission was not granted")]
    AuthorizationDenied,

    #[error("Native call failed: {0}")]
    NativeTransportError(NativeError),
}

impl BridgeError {
    pub(crate) fn invalid_option(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable name for the error kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::InvalidOption { .. } => "InvalidOption",
            Self::PrepareFailed(_) => "PrepareFailed",
            Self::AlreadyActive(_) => "AlreadyActive",
            Self::InvalidTransition { .. } => "InvalidTransition",
            Self::SeekOutOfRange { .. } => "SeekOutOfRange",
            Self::AuthorizationDenied => "AuthorizationDenied",
            Self::NativeTransportError(_) => "NativeTransportError",
        }
    }
}

pub type BridgeResult<T> = std::result::Result<T, BridgeError>;
