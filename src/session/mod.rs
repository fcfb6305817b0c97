//! Recorder and player session controllers
//!
//! Each controller owns:
//! - its lifecycle state (`SessionState`)
//! - its native event subscriptions (bound per hardware session)
//! - the caller's `on_progress` / `on_finished` handler slots
//!
//! Commands and native events are serialized through one lock per
//! controller, so a handler never observes a half-applied transition.

mod bridge;
mod events;
mod player;
mod recorder;
mod state;
mod status;

pub use bridge::AudioBridge;
pub use events::{FinishStatus, FinishedData, Handler, ProgressData, SessionHandlers};
pub use player::PlayerSession;
pub use recorder::RecorderSession;
pub use state::{SessionKind, SessionState};
pub use status::SessionStatus;
