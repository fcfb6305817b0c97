//! HTTP control surface for the application layer
//!
//! - POST /recorder/{prepare,start,pause,resume,stop} - Recorder lifecycle
//! - GET /recorder/status - Recorder state and last notifications
//! - POST /player/{play,pause,unpause,stop,seek} - Player lifecycle
//! - GET /player/outputs - Output routes and availability
//! - GET /player/status - Player state and last notifications
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::ErrorResponse;
pub use routes::create_router;
pub use state::{AppState, LastEvents};
