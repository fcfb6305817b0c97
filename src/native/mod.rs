//! Native capability surface
//!
//! Traits the platform audio service is driven through, the platform
//! descriptor that selects argument and permission conventions, and the
//! event channels the surface emits progress/finished notifications on.

mod backend;
mod emitter;
pub mod simulated;

pub use backend::{
    AuthorizationRoute, PermissionRequester, PermissionResult, PlatformCapabilities, PlatformTarget,
    PlayerBackend, RecorderBackend,
};
pub use emitter::{EventEmitter, EventKind, ListenerId, NativeEvent};
pub use simulated::{SimulatedPermissions, SimulatedPlayer, SimulatedRecorder};
