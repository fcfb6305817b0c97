// Scriptable native surfaces shared by the integration tests
//
// Each mock records the calls it receives, can be told to reject a call,
// and exposes its emitter so tests can fire native notifications directly.

#![allow(dead_code)]

use audio_session_bridge::native::EventEmitter;
use audio_session_bridge::{NativeCallArgs, NativeError, PlayerBackend, RecorderBackend};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const RECORDING_PATH: &str = "/tmp/mock-recording.aac";

#[derive(Default)]
struct RecorderScript {
    calls: Vec<String>,
    prepare_args: Vec<NativeCallArgs>,
    fail: Vec<&'static str>,
    finished_on_stop: Option<Value>,
}

pub struct MockRecorder {
    events: Arc<EventEmitter>,
    authorized: AtomicBool,
    script: Mutex<RecorderScript>,
}

impl MockRecorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Arc::new(EventEmitter::new()),
            authorized: AtomicBool::new(true),
            script: Mutex::new(RecorderScript::default()),
        })
    }

    pub fn emitter(&self) -> Arc<EventEmitter> {
        Arc::clone(&self.events)
    }

    pub fn set_authorized(&self, authorized: bool) {
        self.authorized.store(authorized, Ordering::SeqCst);
    }

    /// Reject the named native call ("prepare", "start", "stop", ...)
    pub fn fail_on(&self, call: &'static str) {
        self.script.lock().unwrap().fail.push(call);
    }

    /// Emit `recordingFinished` with `payload` from inside the native stop
    pub fn finish_on_stop(&self, payload: Value) {
        self.script.lock().unwrap().finished_on_stop = Some(payload);
    }

    pub fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn prepare_args(&self) -> Vec<NativeCallArgs> {
        self.script.lock().unwrap().prepare_args.clone()
    }

    fn enter(&self, call: &'static str) -> Result<String, NativeError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(call.to_string());
        if script.fail.contains(&call) {
            return Err(NativeError::new("MOCK_FAILURE", format!("{} rejected", call)));
        }
        Ok(RECORDING_PATH.to_string())
    }
}

#[async_trait::async_trait]
impl RecorderBackend for MockRecorder {
    async fn prepare(&self, args: NativeCallArgs) -> Result<String, NativeError> {
        self.script.lock().unwrap().prepare_args.push(args);
        self.enter("prepare")
    }

    async fn start(&self) -> Result<String, NativeError> {
        self.enter("start")
    }

    async fn pause(&self) -> Result<String, NativeError> {
        self.enter("pause")
    }

    async fn resume(&self) -> Result<String, NativeError> {
        self.enter("resume")
    }

    async fn stop(&self) -> Result<String, NativeError> {
        let path = self.enter("stop")?;
        let payload = self.script.lock().unwrap().finished_on_stop.take();
        if let Some(payload) = payload {
            self.events.emit("recordingFinished", payload);
        }
        Ok(path)
    }

    async fn check_authorization(&self) -> bool {
        self.authorized.load(Ordering::SeqCst)
    }

    async fn request_authorization(&self) -> bool {
        self.script
            .lock()
            .unwrap()
            .calls
            .push("request_authorization".to_string());
        self.authorized.load(Ordering::SeqCst)
    }

    fn events(&self) -> Arc<EventEmitter> {
        Arc::clone(&self.events)
    }

    fn name(&self) -> &str {
        "mock-recorder"
    }
}

#[derive(Default)]
struct PlayerScript {
    calls: Vec<String>,
    play_args: Vec<NativeCallArgs>,
    fail: Vec<&'static str>,
    seeks: Vec<f64>,
}

pub struct MockPlayer {
    events: Arc<EventEmitter>,
    duration: f64,
    outputs: Vec<String>,
    script: Mutex<PlayerScript>,
}

impl MockPlayer {
    pub fn new(duration: f64, outputs: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            events: Arc::new(EventEmitter::new()),
            duration,
            outputs: outputs.iter().map(|o| o.to_string()).collect(),
            script: Mutex::new(PlayerScript::default()),
        })
    }

    pub fn emitter(&self) -> Arc<EventEmitter> {
        Arc::clone(&self.events)
    }

    pub fn fail_on(&self, call: &'static str) {
        self.script.lock().unwrap().fail.push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn play_args(&self) -> Vec<NativeCallArgs> {
        self.script.lock().unwrap().play_args.clone()
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.script.lock().unwrap().seeks.clone()
    }

    fn enter(&self, call: &'static str) -> Result<(), NativeError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(call.to_string());
        if script.fail.contains(&call) {
            return Err(NativeError::new("MOCK_FAILURE", format!("{} rejected", call)));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl PlayerBackend for MockPlayer {
    async fn play(&self, args: NativeCallArgs) -> Result<(), NativeError> {
        self.script.lock().unwrap().play_args.push(args);
        self.enter("play")
    }

    async fn play_with_url(&self, args: NativeCallArgs) -> Result<(), NativeError> {
        self.script.lock().unwrap().play_args.push(args);
        self.enter("play_with_url")
    }

    async fn pause(&self) -> Result<String, NativeError> {
        self.enter("pause").map(|_| "paused".to_string())
    }

    async fn unpause(&self) -> Result<String, NativeError> {
        self.enter("unpause").map(|_| "playing".to_string())
    }

    async fn stop(&self) -> Result<String, NativeError> {
        self.enter("stop").map(|_| "stopped".to_string())
    }

    async fn skip_to_seconds(&self, seconds: f64) -> Result<(), NativeError> {
        self.enter("skip_to_seconds")?;
        self.script.lock().unwrap().seeks.push(seconds);
        Ok(())
    }

    async fn set_current_time(&self, seconds: f64) -> Result<(), NativeError> {
        self.enter("set_current_time")?;
        self.script.lock().unwrap().seeks.push(seconds);
        Ok(())
    }

    async fn get_duration(&self) -> Result<f64, NativeError> {
        self.enter("get_duration")?;
        Ok(self.duration)
    }

    async fn get_duration_from_path(&self, _path: &str) -> Result<f64, NativeError> {
        self.enter("get_duration_from_path")?;
        Ok(self.duration)
    }

    async fn get_outputs(&self) -> Result<Vec<String>, NativeError> {
        self.enter("get_outputs")?;
        Ok(self.outputs.clone())
    }

    fn events(&self) -> Arc<EventEmitter> {
        Arc::clone(&self.events)
    }

    fn name(&self) -> &str {
        "mock-player"
    }
}

/// Poll `check` until it holds or two seconds pass
pub async fn eventually<F: FnMut() -> bool>(mut check: F) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

/// Give spawned pump tasks a chance to run
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
