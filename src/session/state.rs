use serde::{Deserialize, Serialize};
use std::fmt;

/// Which hardware session a controller drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Recorder,
    Player,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recorder => write!(f, "recorder"),
            Self::Player => write!(f, "player"),
        }
    }
}

/// Lifecycle state shared by the recorder and player state machines
///
/// `Finished` is transient: it is only observable from inside an
/// `on_finished` handler, after which the session rests in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Prepared,
    Active,
    Paused,
    Finished,
}

impl SessionState {
    /// Hardware is running or held paused
    pub fn is_live(self) -> bool {
        matches!(self, Self::Active | Self::Paused)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Prepared => "prepared",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Finished => "finished",
        };
        f.write_str(name)
    }
}
