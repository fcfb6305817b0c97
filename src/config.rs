use crate::error::BridgeResult;
use crate::native::{PlatformCapabilities, PlatformTarget};
use crate::options::{
    AudioEncoding, AudioQuality, OptionNormalizer, OutputFormat, OutputRoute, PlaybackOptions,
    RecordingOptions, SessionCategory,
};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub platform: PlatformConfig,
    pub recording: RecordingConfig,
    pub playback: PlaybackConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "audio-session-bridge".to_string(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub target: PlatformTarget,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Directory relative recording paths resolve against (`~` allowed)
    pub recordings_dir: String,
    pub progress_interval_ms: u64,
    pub defaults: RecordingDefaults,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            recordings_dir: "~/Recordings".to_string(),
            progress_interval_ms: 250,
            defaults: RecordingDefaults::default(),
        }
    }
}

/// Overrides for the documented recording defaults
///
/// Keys are snake_case because config keys are case-folded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecordingDefaults {
    pub sample_rate: Option<f64>,
    pub channels: Option<u16>,
    pub audio_quality: Option<AudioQuality>,
    pub audio_encoding: Option<AudioEncoding>,
    pub output_format: Option<OutputFormat>,
    pub metering_enabled: Option<bool>,
    pub measurement_mode: Option<bool>,
    pub audio_encoding_bit_rate: Option<i64>,
    pub include_base64: Option<bool>,
    pub audio_source: Option<u8>,
    pub should_resume: Option<bool>,
}

impl From<RecordingDefaults> for RecordingOptions {
    fn from(d: RecordingDefaults) -> Self {
        Self {
            sample_rate: d.sample_rate,
            channels: d.channels,
            audio_quality: d.audio_quality,
            audio_encoding: d.audio_encoding,
            output_format: d.output_format,
            metering_enabled: d.metering_enabled,
            measurement_mode: d.measurement_mode,
            audio_encoding_bit_rate: d.audio_encoding_bit_rate,
            include_base64: d.include_base64,
            audio_source: d.audio_source,
            should_resume: d.should_resume,
            extra: Default::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub progress_interval_ms: u64,
    pub defaults: PlaybackDefaults,
    /// Output keys the simulated player reports as available
    pub outputs: Vec<String>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            progress_interval_ms: 250,
            defaults: PlaybackDefaults::default(),
            outputs: vec![
                OutputRoute::Phone.key().to_string(),
                OutputRoute::PhoneSpeaker.key().to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaybackDefaults {
    pub session_category: Option<SessionCategory>,
    pub number_of_loops: Option<i64>,
    pub output: Option<OutputRoute>,
}

impl From<PlaybackDefaults> for PlaybackOptions {
    fn from(d: PlaybackDefaults) -> Self {
        Self {
            session_category: d.session_category,
            number_of_loops: d.number_of_loops,
            output: d.output,
            extra: Default::default(),
        }
    }
}

impl Config {
    /// Load from `path` (any format the `config` crate knows, optional) and
    /// `AUDIO_BRIDGE_*` environment variables
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("AUDIO_BRIDGE").separator("__"))
            .build()
            .context("Failed to read configuration")?;

        settings
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    pub fn capabilities(&self) -> PlatformCapabilities {
        PlatformCapabilities::for_target(self.platform.target)
    }

    /// Normalizer whose defaults are the documented ones overlaid with ours
    pub fn normalizer(&self) -> BridgeResult<OptionNormalizer> {
        let base = OptionNormalizer::new(self.capabilities().convention);

        let recording = base
            .recording_defaults()
            .merge(&self.recording.defaults.clone().into());
        recording.validate()?;
        let playback = base
            .playback_defaults()
            .merge(&self.playback.defaults.clone().into());
        playback.validate()?;

        Ok(OptionNormalizer::with_defaults(base.convention(), recording, playback))
    }

    pub fn recordings_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.recording.recordings_dir).into_owned())
    }

    /// Resolve a caller path against `recordings_dir` unless already absolute
    pub fn resolve_recording_path(&self, path: &str) -> String {
        let expanded = shellexpand::tilde(path).into_owned();
        let candidate = PathBuf::from(&expanded);
        if candidate.is_absolute() {
            expanded
        } else {
            self.recordings_dir().join(candidate).display().to_string()
        }
    }

    pub fn recording_progress_interval(&self) -> Duration {
        Duration::from_millis(self.recording.progress_interval_ms.max(1))
    }

    pub fn playback_progress_interval(&self) -> Duration {
        Duration::from_millis(self.playback.progress_interval_ms.max(1))
    }
}
