use super::state::{SessionKind, SessionState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of a session controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub kind: SessionKind,

    pub state: SessionState,

    /// Id assigned on prepare/play, cleared on return to Idle
    pub session_id: Option<String>,

    /// Recording destination or playback source
    pub path: Option<String>,

    /// When the hardware session last started
    pub started_at: Option<DateTime<Utc>>,

    /// Last `currentTime` reported by a progress event
    pub current_time: Option<f64>,

    /// Playback duration in seconds, when known
    pub duration: Option<f64>,
}
