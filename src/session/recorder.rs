use super::events::{FinishedData, Handler, ProgressData, SessionHandlers};
use super::state::{SessionKind, SessionState};
use super::status::SessionStatus;
use crate::error::{BridgeError, BridgeResult};
use crate::native::{
    AuthorizationRoute, EventKind, NativeEvent, PermissionRequester, PermissionResult,
    PlatformCapabilities, RecorderBackend,
};
use crate::options::{OptionNormalizer, RecordingOptions, RecordingSettings};
use crate::subscription::{spawn_pump, EventSink, SubscriptionManager};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Mutable recorder state; every transition happens under the session lock
pub(crate) struct RecorderCore {
    state: SessionState,
    session_id: Option<String>,
    path: Option<String>,
    settings: Option<RecordingSettings>,
    started_at: Option<DateTime<Utc>>,
    current_time: Option<f64>,
    handlers: SessionHandlers,
    subscriptions: SubscriptionManager,
}

impl RecorderCore {
    fn handle_event(&mut self, event: NativeEvent) {
        match event.kind {
            EventKind::Progress => {
                let data: ProgressData = match serde_json::from_value(event.payload) {
                    Ok(data) => data,
                    Err(e) => {
                        warn!("Dropping malformed recording progress payload: {}", e);
                        return;
                    }
                };
                match self.state {
                    SessionState::Active => {
                        self.current_time = Some(data.current_time);
                        self.handlers.on_progress.call(&data);
                    }
                    SessionState::Paused => {
                        debug!("Suppressing progress tick while paused ({:.2}s)", data.current_time)
                    }
                    state => debug!("Dropping progress tick while {}", state),
                }
            }
            EventKind::Finished => {
                if !self.state.is_live() {
                    debug!("Dropping recordingFinished while {}", self.state);
                    return;
                }
                info!("Native recorder finished on its own");
                self.finish(parse_finished(event.payload));
            }
        }
    }

    /// Unbind, expose `Finished` to the handler, then rest in `Idle`
    fn finish(&mut self, data: FinishedData) {
        self.subscriptions.unbind();
        self.state = SessionState::Finished;
        info!(
            "Recording {} finished: {:?}",
            self.session_id.as_deref().unwrap_or("-"),
            data.status
        );
        self.handlers.on_finished.call(&data);
        self.reset();
    }

    fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.session_id = None;
        self.path = None;
        self.settings = None;
        self.started_at = None;
    }

    fn invalid(&self, operation: &'static str) -> BridgeError {
        BridgeError::InvalidTransition {
            kind: SessionKind::Recorder,
            operation,
            state: self.state,
        }
    }
}

impl EventSink for RecorderCore {
    fn dispatch_pending(&mut self) {
        for event in self.subscriptions.drain() {
            self.handle_event(event);
        }
    }
}

pub(crate) fn parse_finished(payload: Value) -> FinishedData {
    serde_json::from_value(payload).unwrap_or_else(|e| {
        warn!("Malformed finished payload: {}", e);
        FinishedData::failed(format!("malformed finished payload: {}", e))
    })
}

/// Recording lifecycle: prepare → start → [pause ⇄ resume] → stop
pub struct RecorderSession {
    backend: Arc<dyn RecorderBackend>,
    normalizer: OptionNormalizer,
    capabilities: PlatformCapabilities,
    permissions: Option<Arc<dyn PermissionRequester>>,
    core: Arc<Mutex<RecorderCore>>,
}

impl RecorderSession {
    pub fn new(backend: Arc<dyn RecorderBackend>, capabilities: PlatformCapabilities) -> Self {
        let subscriptions = SubscriptionManager::new(SessionKind::Recorder, backend.events());
        let core = RecorderCore {
            state: SessionState::Idle,
            session_id: None,
            path: None,
            settings: None,
            started_at: None,
            current_time: None,
            handlers: SessionHandlers::default(),
            subscriptions,
        };

        Self {
            normalizer: OptionNormalizer::new(capabilities.convention),
            backend,
            capabilities,
            permissions: None,
            core: Arc::new(Mutex::new(core)),
        }
    }

    /// Replace the default-record normalizer (e.g. with configured defaults)
    pub fn with_normalizer(mut self, normalizer: OptionNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Host permission facility, used when authorization is delegated
    pub fn with_permissions(mut self, permissions: Arc<dyn PermissionRequester>) -> Self {
        self.permissions = Some(permissions);
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
            kind: SessionKind::Recorder,
            state: core.state,
            session_id: core.session_id.clone(),
            path: core.path.clone(),
            started_at: core.started_at,
            current_time: core.current_time,
            duration: None,
        }
    }

    /// Settings of the current preparation, if any
    pub async fn settings(&self) -> Option<RecordingSettings> {
        self.core.lock().await.settings.clone()
    }

    pub async fn check_authorization(&self) -> bool {
        self.backend.check_authorization().await
    }

    /// Prompt for recording permission via the platform's route
    pub async fn request_authorization(&self) -> bool {
        match self.capabilities.authorization {
            AuthorizationRoute::Recorder => self.backend.request_authorization().await,
            AuthorizationRoute::PermissionFacility => match &self.permissions {
                Some(permissions) => {
                    let result = permissions.request_record_audio().await;
                    debug!("Record-audio permission prompt answered {:?}", result);
                    result == PermissionResult::Granted
                }
                None => {
                    warn!("No permission facility configured; treating as denied");
                    false
                }
            },
        }
    }

    /// Configure the native recorder for `path`
    ///
    /// Valid from Idle, Finished, or Prepared (re-preparing replaces the
    /// unstarted configuration). Returns the merged settings.
    pub async fn prepare(
        &self,
        path: &str,
        options: &RecordingOptions,
    ) -> BridgeResult<RecordingSettings> {
        let mut core = self.core.lock().await;
        if core.state.is_live() {
            warn!("prepare rejected: recording already {}", core.state);
            return Err(BridgeError::AlreadyActive(SessionKind::Recorder));
        }

        let normalized = self.normalizer.recording(path, options)?;
        let reconfiguring = core.state == SessionState::Prepared;

        if !self.backend.check_authorization().await {
            warn!("prepare rejected: recording not authorized");
            return Err(BridgeError::AuthorizationDenied);
        }

        match self.backend.prepare(normalized.call).await {
            Ok(native_path) => {
                let session_id = format!("recording-{}", uuid::Uuid::new_v4());
                info!(
                    "Prepared {} at {} via {} ({} Hz, {} ch)",
                    session_id,
                    native_path,
                    self.backend.name(),
                    normalized.settings.sample_rate,
                    normalized.settings.channels
                );
                core.state = SessionState::Prepared;
                core.session_id = Some(session_id);
                core.path = Some(native_path);
                core.settings = Some(normalized.settings.clone());
                core.current_time = None;
                Ok(normalized.settings)
            }
            Err(e) => {
                error!("Native prepare failed for {}: {}", path, e);
                if reconfiguring {
                    warn!(
                        "Keeping prepared configuration at {}",
                        core.path.as_deref().unwrap_or_default()
                    );
                } else {
                    core.reset();
                }
                Err(BridgeError::PrepareFailed(e))
            }
        }
    }

    /// Start capturing; subscriptions are bound before the native start
    pub async fn start(&self) -> BridgeResult<String> {
        let mut core = self.core.lock().await;
        match core.state {
            SessionState::Prepared => {}
            state if state.is_live() => {
                warn!("start rejected: recording already {}", state);
                return Err(BridgeError::AlreadyActive(SessionKind::Recorder));
            }
            _ => return Err(core.invalid("start")),
        }

        let notify = core.subscriptions.bind();
        let pump = spawn_pump(Arc::downgrade(&self.core), notify);
        core.subscriptions.attach_pump(pump);

        match self.backend.start().await {
            Ok(path) => {
                core.state = SessionState::Active;
                core.started_at = Some(Utc::now());
                core.current_time = Some(0.0);
                info!(
                    "Recording {} started",
                    core.session_id.as_deref().unwrap_or("-")
                );
                Ok(path)
            }
            Err(e) => {
                error!("Native start failed: {}", e);
                core.subscriptions.unbind();
                Err(BridgeError::NativeTransportError(e))
            }
        }
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
        info!("Recording paused");
        Ok(path)
    }

    pub async fn resume(&self) -> BridgeResult<String> {
        let mut core = self.core.lock().await;
        if core.state != SessionState::Paused {
            return Err(core.invalid("resume"));
        }

        let path = self
            .backend
            .resume()
            .await
            .map_err(BridgeError::NativeTransportError)?;
        core.state = SessionState::Active;
        info!("Recording resumed");
        Ok(path)
    }

    /// Stop capturing and return the finished notification
    ///
    /// Always ends in Idle with subscriptions released, even when the
    /// native stop fails.
    pub async fn stop(&self) -> BridgeResult<FinishedData> {
        let mut core = self.core.lock().await;
        if !core.state.is_live() {
            return Err(core.invalid("stop"));
        }

        let result = self.backend.stop().await;

        // Events emitted up to and during the native stop still belong to
        // this recording.
        let mut finished = None;
        for event in core.subscriptions.drain() {
            match event.kind {
                EventKind::Progress => core.handle_event(event),
                EventKind::Finished => {
                    if finished.is_none() {
                        finished = Some(parse_finished(event.payload));
                    }
                }
            }
        }

        match result {
            Ok(path) => {
                let data = finished.unwrap_or_else(|| FinishedData::recorded(&path));
                core.finish(data.clone());
                Ok(data)
            }
            Err(e) => {
                error!("Native stop failed: {}", e);
                core.finish(FinishedData::failed(e.message.clone()));
                Err(BridgeError::NativeTransportError(e))
            }
        }
    }

    #[cfg(test)]
    async fn subscription_releases(&self) -> u64 {
        self.core.lock().await.subscriptions.releases()
    }
}
