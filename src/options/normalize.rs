use super::playback::{PlaybackOptions, PlaybackSettings};
use super::recording::{RecordingOptions, RecordingSettings};
use crate::error::{BridgeError, BridgeResult};
use crate::session::SessionKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a native surface wants its prepare/play arguments shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallConvention {
    /// Fixed-order argument list (iOS recorder)
    Positional,
    /// Path plus the merged options record (Android)
    OptionRecord,
}

/// Recording fields passed after the path by the positional convention, in order
pub const POSITIONAL_FIELDS: [&str; 6] = [
    "SampleRate",
    "Channels",
    "AudioQuality",
    "AudioEncoding",
    "MeteringEnabled",
    "ShouldResume",
];

/// Argument shape for one native prepare/play call
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCallArgs {
    /// `[path, SampleRate, Channels, AudioQuality, AudioEncoding, MeteringEnabled, ShouldResume]`
    Positional(Vec<Value>),
    PathAndRecord {
        path: String,
        options: Map<String, Value>,
    },
}

impl NativeCallArgs {
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Positional(args) => args.first().and_then(Value::as_str),
            Self::PathAndRecord { path, .. } => Some(path),
        }
    }
}

/// Merged record plus the call shape derived from it
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<S> {
    pub settings: S,
    pub call: NativeCallArgs,
}

/// Merges caller options over defaults and shapes the native call
///
/// Pure: holds only the call convention and the default records.
#[derive(Debug, Clone)]
pub struct OptionNormalizer {
    convention: CallConvention,
    recording_defaults: RecordingSettings,
    playback_defaults: PlaybackSettings,
}

impl OptionNormalizer {
    pub fn new(convention: CallConvention) -> Self {
        Self::with_defaults(convention, RecordingSettings::default(), PlaybackSettings::default())
    }

    pub fn with_defaults(
        convention: CallConvention,
        recording_defaults: RecordingSettings,
        playback_defaults: PlaybackSettings,
    ) -> Self {
        Self {
            convention,
            recording_defaults,
            playback_defaults,
        }
    }

    pub fn convention(&self) -> CallConvention {
        self.convention
    }

    pub fn recording_defaults(&self) -> &RecordingSettings {
        &self.recording_defaults
    }

    pub fn playback_defaults(&self) -> &PlaybackSettings {
        &self.playback_defaults
    }

    pub fn recording(
        &self,
        path: &str,
        options: &RecordingOptions,
    ) -> BridgeResult<Normalized<RecordingSettings>> {
        check_path(path)?;
        let settings = self.recording_defaults.merge(options);
        settings.validate()?;

        let record = to_record(&settings)?;
        let call = match self.convention {
            CallConvention::Positional => {
                let format_id = settings.audio_encoding.ios_format_id().ok_or_else(|| {
                    BridgeError::invalid_option(
                        "AudioEncoding",
                        format!("{:?} is not available on this recorder", settings.audio_encoding),
                    )
                })?;

                let mut args = Vec::with_capacity(POSITIONAL_FIELDS.len() + 1);
                args.push(Value::String(path.to_string()));
                args.extend(POSITIONAL_FIELDS.iter().map(|field| match *field {
                    // The positional recorder takes platform constants, not names
                    "AudioQuality" => Value::from(settings.audio_quality.ios_constant()),
                    "AudioEncoding" => Value::from(format_id),
                    _ => record.get(*field).cloned().unwrap_or(Value::Null),
                }));
                NativeCallArgs::Positional(args)
            }
            CallConvention::OptionRecord => NativeCallArgs::PathAndRecord {
                path: path.to_string(),
                options: record,
            },
        };

        Ok(Normalized { settings, call })
    }

    /// Playback always uses path + record, whatever the recorder convention
    pub fn playback(
        &self,
        path: &str,
        options: &PlaybackOptions,
    ) -> BridgeResult<Normalized<PlaybackSettings>> {
        check_path(path)?;
        let settings = self.playback_defaults.merge(options);
        settings.validate()?;

        let call = NativeCallArgs::PathAndRecord {
            path: path.to_string(),
            options: to_record(&settings)?,
        };

        Ok(Normalized { settings, call })
    }

    /// Untyped entry point: `options` is a JSON object with any subset of fields
    pub fn normalize(&self, kind: SessionKind, path: &str, options: Value) -> BridgeResult<NativeCallArgs> {
        match kind {
            SessionKind::Recorder => {
                let options = RecordingOptions::from_value(options)?;
                Ok(self.recording(path, &options)?.call)
            }
            SessionKind::Player => {
                let options = PlaybackOptions::from_value(options)?;
                Ok(self.playback(path, &options)?.call)
            }
        }
    }
}

fn check_path(path: &str) -> BridgeResult<()> {
    if path.trim().is_empty() {
        return Err(BridgeError::invalid_option("path", "must not be empty"));
    }
    Ok(())
}

fn to_record<S: Serialize>(settings: &S) -> BridgeResult<Map<String, Value>> {
    match serde_json::to_value(settings) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(BridgeError::invalid_option(
            "options",
            format!("expected an object, got {}", other),
        )),
        Err(e) => Err(BridgeError::invalid_option("options", e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_positional_args_follow_documented_order() {
        let normalizer = OptionNormalizer::new(CallConvention::Positional);
        let call = normalizer
            .normalize(SessionKind::Recorder, "/tmp/a.caf", json!({ "MeteringEnabled": true }))
            .unwrap();

        assert_eq!(
            call,
            NativeCallArgs::Positional(vec![
                json!("/tmp/a.caf"),
                json!(44100.0),
                json!(2),
                json!(0x60),
                json!(u32::from_be_bytes(*b"ima4")),
                json!(true),
                json!(true),
            ])
        );
    }

    #[test]
    fn test_playback_ignores_recorder_convention() {
        let normalizer = OptionNormalizer::new(CallConvention::Positional);
        let call = normalizer
            .normalize(SessionKind::Player, "/tmp/a.caf", Value::Null)
            .unwrap();

        assert!(matches!(call, NativeCallArgs::PathAndRecord { .. }));
        assert_eq!(call.path(), Some("/tmp/a.caf"));
    }

    #[test]
    fn test_positional_rejects_android_only_encoding() {
        let normalizer = OptionNormalizer::new(CallConvention::Positional);
        let err = normalizer
            .normalize(SessionKind::Recorder, "/tmp/a.caf", json!({ "AudioEncoding": "vorbis" }))
            .unwrap_err();
        assert_eq!(err.kind_name(), "InvalidOption");

        // The option-record convention passes the name through untouched
        let normalizer = OptionNormalizer::new(CallConvention::OptionRecord);
        assert!(normalizer
            .normalize(SessionKind::Recorder, "/tmp/a.ogg", json!({ "AudioEncoding": "vorbis" }))
            .is_ok());
    }

    #[test]
    fn test_empty_path_rejected() {
        let normalizer = OptionNormalizer::new(CallConvention::OptionRecord);
        let err = normalizer
            .recording("  ", &RecordingOptions::default())
            .unwrap_err();
        assert_eq!(err.kind_name(), "InvalidOption");
    }
}
