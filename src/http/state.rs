use crate::config::Config;
use crate::session::{AudioBridge, FinishedData, ProgressData, SessionHandlers};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Most recent notifications received for one session kind
#[derive(Debug, Clone, Default, Serialize)]
pub struct LastEvents {
    pub progress: Option<ProgressData>,
    pub finished: Option<FinishedData>,
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub bridge: Arc<AudioBridge>,
    pub config: Arc<Config>,
    pub recorder_events: Arc<Mutex<LastEvents>>,
    pub player_events: Arc<Mutex<LastEvents>>,
}

impl AppState {
    /// Wrap `bridge` and register handlers that record its notifications
    pub async fn new(bridge: AudioBridge, config: Config) -> Self {
        let state = Self {
            bridge: Arc::new(bridge),
            config: Arc::new(config),
            recorder_events: Arc::new(Mutex::new(LastEvents::default())),
            player_events: Arc::new(Mutex::new(LastEvents::default())),
        };

        state
            .bridge
            .recorder
            .set_handlers(capture_handlers(Arc::clone(&state.recorder_events)))
            .await;
        state
            .bridge
            .player
            .set_handlers(capture_handlers(Arc::clone(&state.player_events)))
            .await;

        state
    }
}

fn capture_handlers(events: Arc<Mutex<LastEvents>>) -> SessionHandlers {
    let progress = Arc::clone(&events);
    SessionHandlers::new(
        move |data| {
            progress.lock().expect("event log mutex poisoned").progress = Some(data.clone());
        },
        move |data| {
            events.lock().expect("event log mutex poisoned").finished = Some(data.clone());
        },
    )
}
