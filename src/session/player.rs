use super::events::{FinishedData, Handler, ProgressData, SessionHandlers};
use super::recorder::parse_finished;
use super::state::{SessionKind, SessionState};
use super::status::SessionStatus;
use crate::error::{BridgeError, BridgeResult};
use crate::native::{EventKind, NativeEvent, PlayerBackend};
use crate::options::{
    CallConvention, OptionNormalizer, OutputDescriptor, OutputRoute, PlaybackOptions,
    PlaybackSettings,
};
use crate::subscription::{spawn_pump, EventSink, SubscriptionManager};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub(crate) struct PlayerCore {
    state: SessionState,
    session_id: Option<String>,
    path: Option<String>,
    settings: Option<PlaybackSettings>,
    started_at: Option<DateTime<Utc>>,
    current_time: Option<f64>,
    duration: Option<f64>,
    handlers: SessionHandlers,
    subscriptions: SubscriptionManager,
}

impl PlayerCore {
    fn handle_event(&mut self, event: NativeEvent) {
        match event.kind {
            EventKind::Progress => {
                let data: ProgressData = match serde_json::from_value(event.payload) {
                    Ok(data) => data,
                    Err(e) => {
                        warn!("Dropping malformed playback progress payload: {}", e);
                        return;
                    }
                };
                if self.state == SessionState::Active {
                    self.current_time = Some(data.current_time);
                    self.handlers.on_progress.call(&data);
                } else {
                    debug!("Dropping playback progress while {}", self.state);
                }
            }
            EventKind::Finished => {
                if self.state != SessionState::Active {
                    debug!("Dropping playerFinished while {}", self.state);
                    return;
                }
                let data = parse_finished(event.payload);
                self.subscriptions.unbind();
                self.state = SessionState::Finished;
                if let Some(duration) = self.duration {
                    self.current_time = Some(duration);
                }
                info!(
                    "Playback {} completed",
                    self.session_id.as_deref().unwrap_or("-")
                );
                self.handlers.on_finished.call(&data);
                self.reset();
            }
        }
    }

    fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.session_id = None;
        self.path = None;
        self.settings = None;
        self.started_at = None;
        self.duration = None;
    }

    fn invalid(&self, operation: &'static str) -> BridgeError {
        BridgeError::InvalidTransition {
            kind: SessionKind::Player,
            operation,
            state: self.state,
        }
    }
}

impl EventSink for PlayerCore {
    fn dispatch_pending(&mut self) {
        for event in self.subscriptions.drain() {
            self.handle_event(event);
        }
    }
}

fn is_remote(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Playback lifecycle: play → [pause ⇄ unpause] → stop, or natural completion
pub struct PlayerSession {
    backend: Arc<dyn PlayerBackend>,
    normalizer: OptionNormalizer,
    core: Arc<Mutex<PlayerCore>>,
}

impl PlayerSession {
    pub fn new(backend: Arc<dyn PlayerBackend>) -> Self {
        let subscriptions = SubscriptionManager::new(SessionKind::Player, backend.events());
        let core = PlayerCore {
            state: SessionState::Idle,
            session_id: None,
            path: None,
            settings: None,
            started_at: None,
            current_time: None,
            duration: None,
            handlers: SessionHandlers::default(),
            subscriptions,
        };

        Self {
            backend,
            normalizer: OptionNormalizer::new(CallConvention::OptionRecord),
            core: Arc::new(Mutex::new(core)),
        }
    }

    pub fn with_normalizer(mut self, normalizer: OptionNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub async fn set_handlers(&self, handlers: SessionHandlers) {
        self.core.lock().await.handlers = handlers;
    }

    pub async fn on_progress(&self, f: impl Fn(&ProgressData) + Send + Sync + 'static) {
        self.core.lock().await.handlers.on_progress = Handler::new(f);
    }

    pub async fn on_finished(&self, f: impl Fn(&FinishedData) + Send + Sync + 'static) {
        self.core.lock().await.handlers.on_finished = Handler::new(f);
    }

    pub async fn state(&self) -> SessionState {
        self.core.lock().await.state
    }

    pub async fn status(&self) -> SessionStatus {
        let core = self.core.lock().await;
        SessionStatus {
            kind: SessionKind::Player,
            state: core.state,
            session_id: core.session_id.clone(),
            path: core.path.clone(),
            started_at: core.started_at,
            current_time: core.current_time,
            duration: core.duration,
        }
    }

    pub async fn settings(&self) -> Option<PlaybackSettings> {
        self.core.lock().await.settings.clone()
    }

    /// Start a fresh playback of `path`
    ///
    /// Valid from Idle, Paused (the paused playback is replaced) or
    /// Finished. `output` overrides any route given in `options`.
    pub async fn play(
        &self,
        path: &str,
        options: &PlaybackOptions,
        output: Option<OutputRoute>,
    ) -> BridgeResult<PlaybackSettings> {
        let mut core = self.core.lock().await;
        if core.state == SessionState::Active {
            warn!("play rejected: playback already active");
            return Err(BridgeError::AlreadyActive(SessionKind::Player));
        }

        let mut options = options.clone();
        if output.is_some() {
            options.output = output;
        }
        let normalized = self.normalizer.playback(path, &options)?;
        let replacing = core.state == SessionState::Paused;

        let notify = core.subscriptions.bind();
        let pump = spawn_pump(Arc::downgrade(&self.core), notify);
        core.subscriptions.attach_pump(pump);

        let result = if is_remote(path) {
            self.backend.play_with_url(normalized.call).await
        } else {
            self.backend.play(normalized.call).await
        };

        if let Err(e) = result {
            error!("Native play failed for {}: {}", path, e);
            if replacing {
                // The paused native player is still loaded; release it before going Idle
                if let Err(stop_err) = self.backend.stop().await {
                    warn!("Stopping replaced playback failed: {}", stop_err);
                }
            }
            core.subscriptions.unbind();
            core.reset();
            return Err(BridgeError::PrepareFailed(e));
        }

        let duration = match self.backend.get_duration().await {
            Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => Some(seconds),
            Ok(seconds) => {
                debug!("Ignoring reported duration {}", seconds);
                None
            }
            Err(e) => {
                debug!("Duration unavailable: {}", e);
                None
            }
        };

        let session_id = format!("playback-{}", uuid::Uuid::new_v4());
        info!(
            "Playing {} as {} via {} (output: {})",
            path,
            session_id,
            self.backend.name(),
            normalized
                .settings
                .output
                .map(|o| o.key())
                .unwrap_or("unchanged")
        );
        core.state = SessionState::Active;
        core.session_id = Some(session_id);
        core.path = Some(path.to_string());
        core.settings = Some(normalized.settings.clone());
        core.started_at = Some(Utc::now());
        core.current_time = Some(0.0);
        core.duration = duration;

        Ok(normalized.settings)
    }

    pub async fn pause(&self) -> BridgeResult<String> {
        let mut core = self.core.lock().await;
        if core.state != SessionState::Active {
            return Err(core.invalid("pause"));
        }

        let path = self
            .backend
            .pause()
            .await
            .map_err(BridgeError::NativeTransportError)?;
        core.state = SessionState::Paused;
        info!("Playback paused");
        Ok(path)
    }

    /// Resume the paused native playback; options and subscriptions are kept
    pub async fn unpause(&self) -> BridgeResult<String> {
        let mut core = self.core.lock().await;
        if core.state != SessionState::Paused {
            return Err(core.invalid("unpause"));
        }

        let path = self
            .backend
            .unpause()
            .await
            .map_err(BridgeError::NativeTransportError)?;
        core.state = SessionState::Active;
        info!("Playback resumed");
        Ok(path)
    }

    /// Caller-initiated stop; goes straight to Idle without `on_finished`
    pub async fn stop(&self) -> BridgeResult<String> {
        let mut core = self.core.lock().await;
        if !core.state.is_live() {
            return Err(core.invalid("stop"));
        }

        let result = self.backend.stop().await;
        core.subscriptions.unbind();
        core.reset();

        match result {
            Ok(path) => {
                info!("Playback stopped");
                Ok(path)
            }
            Err(e) => {
                error!("Native stop failed: {}", e);
                Err(BridgeError::NativeTransportError(e))
            }
        }
    }

    pub async fn skip_to_seconds(&self, seconds: f64) -> BridgeResult<()> {
        let mut core = self.core.lock().await;
        check_seek(&core, seconds)?;

        self.backend
            .skip_to_seconds(seconds)
            .await
            .map_err(BridgeError::NativeTransportError)?;
        core.current_time = Some(seconds);
        debug!("Skipped to {:.2}s", seconds);
        Ok(())
    }

    pub async fn set_current_time(&self, seconds: f64) -> BridgeResult<()> {
        let mut core = self.core.lock().await;
        check_seek(&core, seconds)?;

        self.backend
            .set_current_time(seconds)
            .await
            .map_err(BridgeError::NativeTransportError)?;
        core.current_time = Some(seconds);
        debug!("Current time set to {:.2}s", seconds);
        Ok(())
    }

    pub async fn get_duration(&self) -> BridgeResult<f64> {
        self.backend
            .get_duration()
            .await
            .map_err(BridgeError::NativeTransportError)
    }

    /// Duration of the file at `path` without touching the current playback
    pub async fn get_duration_from_path(&self, path: &str) -> BridgeResult<f64> {
        if path.is_empty() {
            return Err(BridgeError::invalid_option("path", "must not be empty"));
        }
        let seconds = self
            .backend
            .get_duration_from_path(path)
            .await
            .map_err(BridgeError::NativeTransportError)?;
        debug!("{} lasts {:.3}s", path, seconds);
        Ok(seconds)
    }

    /// Every known output route with its current availability
    pub async fn get_outputs(&self) -> BridgeResult<Vec<OutputDescriptor>> {
        let keys = self
            .backend
            .get_outputs()
            .await
            .map_err(BridgeError::NativeTransportError)?;

        let mut available = HashSet::new();
        for key in &keys {
            match key.parse::<OutputRoute>() {
                Ok(route) => {
                    available.insert(route);
                }
                Err(_) => warn!("Ignoring unknown output route '{}'", key),
            }
        }

        Ok(OutputRoute::ALL
            .into_iter()
            .map(|route| OutputDescriptor {
                key: route.key().to_string(),
                available: available.contains(&route),
            })
            .collect())
    }
}

fn check_seek(core: &PlayerCore, seconds: f64) -> BridgeResult<()> {
    if !core.state.is_live() {
        return Err(core.invalid("seek"));
    }
    let beyond_end = core.duration.is_some_and(|duration| seconds > duration);
    if !seconds.is_finite() || seconds < 0.0 || beyond_end {
        warn!("Seek to {} rejected (duration: {:?})", seconds, core.duration);
        return Err(BridgeError::SeekOutOfRange {
            seconds,
            duration: core.duration,
        });
    }
    Ok(())
}
