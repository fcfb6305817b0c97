//! In-process native surface
//!
//! Stands in for the platform recorder/player: recordings are written as
//! silent 16-bit PCM WAV files, playback reads WAV headers for duration, and
//! progress ticks are driven by a tokio interval.

use super::backend::{PermissionRequester, PermissionResult, PlayerBackend, RecorderBackend};
use super::emitter::EventEmitter;
use crate::error::NativeError;
use crate::options::NativeCallArgs;
use base64::Engine;
use hound::{SampleFormat, WavSpec, WavWriter};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Elapsed-time counter that excludes paused spans
#[derive(Debug, Default)]
struct Stopwatch {
    started: Option<Instant>,
    elapsed: Duration,
}

impl Stopwatch {
    fn start(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    fn stop(&mut self) -> Duration {
        if let Some(started) = self.started.take() {
            self.elapsed += started.elapsed();
        }
        self.elapsed
    }

    fn reset(&mut self) {
        self.started = None;
        self.elapsed = Duration::ZERO;
    }

    fn seconds(&self) -> f64 {
        let running = self.started.map(|s| s.elapsed()).unwrap_or_default();
        (self.elapsed + running).as_secs_f64()
    }
}

#[derive(Debug, Clone)]
struct PreparedRecording {
    path: String,
    sample_rate: u32,
    channels: u16,
    include_base64: bool,
    metering: bool,
}

impl PreparedRecording {
    fn from_args(args: NativeCallArgs) -> Result<Self, NativeError> {
        match args {
            NativeCallArgs::Positional(values) => {
                let path = values
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| NativeError::new("INVALID_PATH", "Please set valid path"))?;
                Ok(Self {
                    path: path.to_string(),
                    sample_rate: sample_rate(values.get(1)),
                    channels: channels(values.get(2)),
                    include_base64: false,
                    metering: values.get(5).and_then(Value::as_bool).unwrap_or(false),
                })
            }
            NativeCallArgs::PathAndRecord { path, options } => Ok(Self {
                sample_rate: sample_rate(options.get("SampleRate")),
                channels: channels(options.get("Channels")),
                include_base64: flag(&options, "IncludeBase64"),
                metering: flag(&options, "MeteringEnabled"),
                path,
            }),
        }
    }
}

fn sample_rate(value: Option<&Value>) -> u32 {
    value
        .and_then(Value::as_f64)
        .map(|rate| rate.max(1.0) as u32)
        .unwrap_or(44100)
}

fn channels(value: Option<&Value>) -> u16 {
    value
        .and_then(Value::as_u64)
        .map(|c| c.clamp(1, 2) as u16)
        .unwrap_or(2)
}

fn flag(options: &Map<String, Value>, key: &str) -> bool {
    options.get(key).and_then(Value::as_bool).unwrap_or(false)
}

#[derive(Default)]
struct RecorderState {
    prepared: Option<PreparedRecording>,
    recording: bool,
    paused: bool,
    stopwatch: Stopwatch,
    ticker: Option<JoinHandle<()>>,
}

/// Simulated recorder backend
pub struct SimulatedRecorder {
    events: Arc<EventEmitter>,
    state: Arc<Mutex<RecorderState>>,
    progress_interval: Duration,
    authorized: AtomicBool,
}

impl SimulatedRecorder {
    pub fn new(progress_interval: Duration) -> Self {
        Self {
            events: Arc::new(EventEmitter::new()),
            state: Arc::new(Mutex::new(RecorderState::default())),
            progress_interval,
            authorized: AtomicBool::new(true),
        }
    }

    pub fn set_authorized(&self, authorized: bool) {
        self.authorized.store(authorized, Ordering::SeqCst);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RecorderState> {
        self.state.lock().expect("simulated recorder mutex poisoned")
    }

    fn spawn_ticker(&self, metering: bool) -> JoinHandle<()> {
        let events = Arc::clone(&self.events);
        let state = Arc::clone(&self.state);
        let period = self.progress_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let current_time = {
                    let state = state.lock().expect("simulated recorder mutex poisoned");
                    if !state.recording {
                        break;
                    }
                    if state.paused {
                        continue;
                    }
                    state.stopwatch.seconds()
                };
                let mut payload = json!({ "currentTime": current_time });
                if metering {
                    payload["currentMetering"] = json!(-160.0);
                    payload["currentPeakMetering"] = json!(-160.0);
                }
                events.emit("recordingProgress", payload);
            }
        })
    }
}

fn write_silence(recording: &PreparedRecording, seconds: f64) -> Result<u64, NativeError> {
    let spec = WavSpec {
        channels: recording.channels,
        sample_rate: recording.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let failed = |e: hound::Error| NativeError::new("RUNTIME_EXCEPTION", e.to_string());

    let mut writer = WavWriter::create(&recording.path, spec).map_err(failed)?;
    let frames = (seconds * recording.sample_rate as f64).round() as u64;
    for _ in 0..frames * recording.channels as u64 {
        writer.write_sample(0i16).map_err(failed)?;
    }
    writer.finalize().map_err(failed)?;

    fs::metadata(&recording.path)
        .map(|m| m.len())
        .map_err(|e| NativeError::new("RUNTIME_EXCEPTION", e.to_string()))
}

#[async_trait::async_trait]
impl RecorderBackend for SimulatedRecorder {
    async fn prepare(&self, args: NativeCallArgs) -> Result<String, NativeError> {
        let recording = PreparedRecording::from_args(args)?;
        let mut state = self.lock();
        if state.recording {
            return Err(NativeError::new(
                "INVALID_STATE",
                "Please call stopRecording before starting recording",
            ));
        }

        let path = Path::new(&recording.path);
        if path.is_dir() {
            return Err(NativeError::new(
                format!("COULDNT_PREPARE_RECORDING_AT_PATH {}", recording.path),
                "Path is a directory",
            ));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                NativeError::new(
                    format!("COULDNT_PREPARE_RECORDING_AT_PATH {}", recording.path),
                    e.to_string(),
                )
            })?;
        }

        debug!("Simulated recorder prepared at {}", recording.path);
        let prepared_path = recording.path.clone();
        state.prepared = Some(recording);
        Ok(prepared_path)
    }

    async fn start(&self) -> Result<String, NativeError> {
        let mut state = self.lock();
        let Some(recording) = state.prepared.clone() else {
            return Err(NativeError::new(
                "RECORDING_NOT_PREPARED",
                "Please call prepareRecordingAtPath before starting recording",
            ));
        };
        if state.recording {
            return Err(NativeError::new(
                "INVALID_STATE",
                "Please call stopRecording before starting recording",
            ));
        }

        state.stopwatch.reset();
        state.stopwatch.start();
        state.recording = true;
        state.paused = false;
        state.ticker = Some(self.spawn_ticker(recording.metering));
        Ok(recording.path)
    }

    async fn pause(&self) -> Result<String, NativeError> {
        let mut state = self.lock();
        if !state.recording || state.paused {
            return Err(NativeError::new("INVALID_STATE", "Please call startRecording before pausing"));
        }
        state.stopwatch.stop();
        state.paused = true;
        Ok(state.prepared.as_ref().map(|r| r.path.clone()).unwrap_or_default())
    }

    async fn resume(&self) -> Result<String, NativeError> {
        let mut state = self.lock();
        if !state.paused {
            return Err(NativeError::new("INVALID_STATE", "Please call pauseRecording before resuming"));
        }
        state.stopwatch.start();
        state.paused = false;
        Ok(state.prepared.as_ref().map(|r| r.path.clone()).unwrap_or_default())
    }

    async fn stop(&self) -> Result<String, NativeError> {
        let (recording, seconds) = {
            let mut state = self.lock();
            if !state.recording {
                return Err(NativeError::new(
                    "INVALID_STATE",
                    "Please call startRecording before stopping recording",
                ));
            }
            if let Some(ticker) = state.ticker.take() {
                ticker.abort();
            }
            state.recording = false;
            state.paused = false;
            let seconds = state.stopwatch.stop().as_secs_f64();
            match state.prepared.take() {
                Some(recording) => (recording, seconds),
                None => {
                    return Err(NativeError::new("RECORDING_NOT_PREPARED", "Recorder lost its output file"))
                }
            }
        };

        let size = write_silence(&recording, seconds)?;
        info!(
            "Simulated recording written: {} ({:.2}s, {} bytes)",
            recording.path, seconds, size
        );

        let mut payload = json!({
            "status": "OK",
            "audioFileURL": format!("file://{}", recording.path),
            "audioFileSize": size,
        });
        if recording.include_base64 {
            let bytes = fs::read(&recording.path)
                .map_err(|e| NativeError::new("RUNTIME_EXCEPTION", e.to_string()))?;
            payload["base64"] = json!(base64::engine::general_purpose::STANDARD.encode(bytes));
        }
        self.events.emit("recordingFinished", payload);

        Ok(recording.path)
    }

    async fn check_authorization(&self) -> bool {
        self.authorized.load(Ordering::SeqCst)
    }

    async fn request_authorization(&self) -> bool {
        self.authorized.load(Ordering::SeqCst)
    }

    fn events(&self) -> Arc<EventEmitter> {
        Arc::clone(&self.events)
    }

    fn name(&self) -> &str {
        "simulated-recorder"
    }
}

#[derive(Default)]
struct PlayerState {
    path: Option<String>,
    duration: f64,
    loops_remaining: i64,
    output: Option<String>,
    /// Position at the last pause/seek
    base: f64,
    started: Option<Instant>,
    playing: bool,
    paused: bool,
    ticker: Option<JoinHandle<()>>,
}

impl PlayerState {
    fn position(&self) -> f64 {
        self.base + self.started.map(|s| s.elapsed().as_secs_f64()).unwrap_or(0.0)
    }

    fn halt(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        self.playing = false;
        self.paused = false;
        self.started = None;
    }
}

/// Simulated player backend; plays WAV files only
pub struct SimulatedPlayer {
    events: Arc<EventEmitter>,
    state: Arc<Mutex<PlayerState>>,
    progress_interval: Duration,
    outputs: Vec<String>,
}

impl SimulatedPlayer {
    pub fn new(progress_interval: Duration, outputs: Vec<String>) -> Self {
        Self {
            events: Arc::new(EventEmitter::new()),
            state: Arc::new(Mutex::new(PlayerState::default())),
            progress_interval,
            outputs,
        }
    }

    /// Output route currently selected, if any play requested one
    pub fn current_output(&self) -> Option<String> {
        self.lock().output.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PlayerState> {
        self.state.lock().expect("simulated player mutex poisoned")
    }

    fn spawn_ticker(&self) -> JoinHandle<()> {
        let events = Arc::clone(&self.events);
        let state = Arc::clone(&self.state);
        let period = self.progress_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let finished = {
                    let mut state = state.lock().expect("simulated player mutex poisoned");
                    if !state.playing {
                        continue;
                    }
                    let position = state.position();
                    if position < state.duration {
                        drop(state);
                        events.emit("playerProgress", json!({ "currentTime": position }));
                        false
                    } else if state.loops_remaining > 0 {
                        state.loops_remaining -= 1;
                        state.base = 0.0;
                        state.started = Some(Instant::now());
                        false
                    } else {
                        state.playing = false;
                        state.started = None;
                        state.base = state.duration;
                        state.ticker = None;
                        true
                    }
                };
                if finished {
                    events.emit("playerFinished", json!({ "status": "OK" }));
                    break;
                }
            }
        })
    }
}

/// Length of a WAV file in seconds, read from its header
fn wav_duration(path: &str) -> Result<f64, NativeError> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| NativeError::new("COULDNT_PREPARE_MEDIAPLAYER", e.to_string()))?;
    let spec = reader.spec();
    Ok(reader.duration() as f64 / spec.sample_rate.max(1) as f64)
}

#[async_trait::async_trait]
impl PlayerBackend for SimulatedPlayer {
    async fn play(&self, args: NativeCallArgs) -> Result<(), NativeError> {
        let NativeCallArgs::PathAndRecord { path, options } = args else {
            return Err(NativeError::new("INVALID_ARGS", "Expected a path and options record"));
        };

        let duration = wav_duration(&path)?;

        let mut state = self.lock();
        state.halt();
        state.path = Some(path.clone());
        state.duration = duration;
        state.loops_remaining = options
            .get("numberOfLoops")
            .and_then(Value::as_i64)
            .unwrap_or(0);
        if let Some(output) = options.get("output").and_then(Value::as_str) {
            state.output = Some(output.to_string());
        }
        state.base = 0.0;
        state.started = Some(Instant::now());
        state.playing = true;
        state.ticker = Some(self.spawn_ticker());

        debug!("Simulated player playing {} ({:.2}s)", path, duration);
        Ok(())
    }

    async fn play_with_url(&self, args: NativeCallArgs) -> Result<(), NativeError> {
        Err(NativeError::new(
            "UNSUPPORTED",
            format!(
                "Remote playback is not available in the simulated player: {}",
                args.path().unwrap_or_default()
            ),
        ))
    }

    async fn pause(&self) -> Result<String, NativeError> {
        let mut state = self.lock();
        if !state.playing {
            return Err(NativeError::new(
                "INVALID_STATE",
                "Please call play or playWithURL before pausing playback",
            ));
        }
        state.base = state.position();
        state.started = None;
        state.playing = false;
        state.paused = true;
        Ok(state.path.clone().unwrap_or_default())
    }

    async fn unpause(&self) -> Result<String, NativeError> {
        let mut state = self.lock();
        if !state.paused {
            return Err(NativeError::new(
                "INVALID_STATE",
                "Please call pause before unpausing playback",
            ));
        }
        state.started = Some(Instant::now());
        state.paused = false;
        state.playing = true;
        Ok(state.path.clone().unwrap_or_default())
    }

    async fn stop(&self) -> Result<String, NativeError> {
        let mut state = self.lock();
        if !state.playing && !state.paused {
            return Err(NativeError::new(
                "INVALID_STATE",
                "Please call play or playWithURL before stopping playback",
            ));
        }
        state.halt();
        state.base = 0.0;
        Ok(state.path.clone().unwrap_or_default())
    }

    async fn skip_to_seconds(&self, seconds: f64) -> Result<(), NativeError> {
        let mut state = self.lock();
        if state.path.is_none() {
            return Err(NativeError::new("INVALID_STATE", "No playback"));
        }
        state.base = seconds;
        if state.playing {
            state.started = Some(Instant::now());
        }
        Ok(())
    }

    async fn set_current_time(&self, seconds: f64) -> Result<(), NativeError> {
        self.skip_to_seconds(seconds).await
    }

    async fn get_duration(&self) -> Result<f64, NativeError> {
        let state = self.lock();
        if state.path.is_none() {
            return Err(NativeError::new(
                "PLAYER_NOT_PREPARED",
                "Please call play before querying the duration",
            ));
        }
        Ok(state.duration)
    }

    async fn get_duration_from_path(&self, path: &str) -> Result<f64, NativeError> {
        if path.is_empty() {
            return Err(NativeError::new("PATH_NOT_SET", "Please provide a path"));
        }
        wav_duration(path)
    }

    async fn get_outputs(&self) -> Result<Vec<String>, NativeError> {
        Ok(self.outputs.clone())
    }

    fn events(&self) -> Arc<EventEmitter> {
        Arc::clone(&self.events)
    }

    fn name(&self) -> &str {
        "simulated-player"
    }
}

/// Permission facility with a fixed answer
pub struct SimulatedPermissions {
    result: PermissionResult,
}

impl SimulatedPermissions {
    pub fn new(result: PermissionResult) -> Self {
        Self { result }
    }
}

#[async_trait::async_trait]
impl PermissionRequester for SimulatedPermissions {
    async fn request_record_audio(&self) -> PermissionResult {
        self.result
    }
}
