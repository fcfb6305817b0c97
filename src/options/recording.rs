use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Encoder quality tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioQuality {
    Low,
    Medium,
    High,
}

/// Codec identifiers understood by either native recorder
///
/// `lpcm` through `amr` are the iOS identifiers; `aac_eld` onwards are
/// Android-only. `aac` is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioEncoding {
    #[serde(rename = "lpcm")]
    Lpcm,
    #[serde(rename = "ima4")]
    Ima4,
    #[serde(rename = "aac")]
    Aac,
    #[serde(rename = "MAC3")]
    Mac3,
    #[serde(rename = "MAC6")]
    Mac6,
    #[serde(rename = "ulaw")]
    Ulaw,
    #[serde(rename = "alaw")]
    Alaw,
    #[serde(rename = "mp1")]
    Mp1,
    #[serde(rename = "mp2")]
    Mp2,
    #[serde(rename = "alac")]
    Alac,
    #[serde(rename = "amr")]
    Amr,
    #[serde(rename = "aac_eld")]
    AacEld,
    #[serde(rename = "amr_nb")]
    AmrNb,
    #[serde(rename = "amr_wb")]
    AmrWb,
    #[serde(rename = "he_aac")]
    HeAac,
    #[serde(rename = "vorbis")]
    Vorbis,
}

impl AudioQuality {
    /// `AVAudioQuality` value the positional (iOS) recorder expects
    pub fn ios_constant(self) -> i64 {
        match self {
            Self::Low => 0x20,
            Self::Medium => 0x40,
            Self::High => 0x60,
        }
    }
}

impl AudioEncoding {
    /// Core Audio format id for the iOS identifiers; `None` for Android-only codecs
    pub fn ios_format_id(self) -> Option<u32> {
        let fourcc = match self {
            Self::Lpcm => b"lpcm",
            Self::Ima4 => b"ima4",
            Self::Aac => b"aac ",
            Self::Mac3 => b"MAC3",
            Self::Mac6 => b"MAC6",
            Self::Ulaw => b"ulaw",
            Self::Alaw => b"alaw",
            Self::Mp1 => b".mp1",
            Self::Mp2 => b".mp2",
            Self::Alac => b"alac",
            Self::Amr => b"samr",
            Self::AacEld | Self::AmrNb | Self::AmrWb | Self::HeAac | Self::Vorbis => return None,
        };
        Some(u32::from_be_bytes(*fourcc))
    }
}

/// Container format (Android recorder only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    #[serde(rename = "mpeg_4")]
    Mpeg4,
    #[serde(rename = "aac_adts")]
    AacAdts,
    #[serde(rename = "amr_nb")]
    AmrNb,
    #[serde(rename = "amr_wb")]
    AmrWb,
    #[serde(rename = "three_gpp")]
    ThreeGpp,
    #[serde(rename = "webm")]
    Webm,
}

/// Android capture source selectors
pub mod audio_source {
    pub const DEFAULT: u8 = 0;
    pub const MIC: u8 = 1;
    pub const VOICE_UPLINK: u8 = 2;
    pub const VOICE_DOWNLINK: u8 = 3;
    pub const VOICE_CALL: u8 = 4;
    pub const CAMCORDER: u8 = 5;
    pub const VOICE_RECOGNITION: u8 = 6;
    pub const VOICE_COMMUNICATION: u8 = 7;
    pub const REMOTE_SUBMIX: u8 = 8;
    pub const UNPROCESSED: u8 = 9;
}

/// Caller-supplied recording options; any subset of fields may be set
///
/// Keys not recognised here are kept in `extra` and forwarded to the
/// native surface untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordingOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_quality: Option<AudioQuality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_encoding: Option<AudioEncoding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metering_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_encoding_bit_rate: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_base64: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_source: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_resume: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RecordingOptions {
    /// Parse a loosely-typed options object, rejecting unknown enum values
    pub fn from_value(value: Value) -> BridgeResult<Self> {
        let value = match value {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        serde_json::from_value(value)
            .map_err(|e| BridgeError::invalid_option("RecordingOptions", e.to_string()))
    }
}

/// Fully-resolved recording record handed to the native recorder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordingSettings {
    pub sample_rate: f64,
    pub channels: u16,
    pub audio_quality: AudioQuality,
    pub audio_encoding: AudioEncoding,
    pub output_format: OutputFormat,
    pub metering_enabled: bool,
    pub measurement_mode: bool,
    pub audio_encoding_bit_rate: i64,
    pub include_base64: bool,
    pub audio_source: u8,
    pub should_resume: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            channels: 2,
            audio_quality: AudioQuality::High,
            audio_encoding: AudioEncoding::Ima4,
            output_format: OutputFormat::Mpeg4,
            metering_enabled: false,
            measurement_mode: false,
            audio_encoding_bit_rate: 32000,
            include_base64: false,
            audio_source: audio_source::DEFAULT,
            should_resume: true,
            extra: Map::new(),
        }
    }
}

impl RecordingSettings {
    /// Shallow merge: every field set in `options` replaces ours
    pub fn merge(&self, options: &RecordingOptions) -> Self {
        let mut extra = self.extra.clone();
        extra.extend(options.extra.iter().map(|(k, v)| (k.clone(), v.clone())));

        Self {
            sample_rate: options.sample_rate.unwrap_or(self.sample_rate),
            channels: options.channels.unwrap_or(self.channels),
            audio_quality: options.audio_quality.unwrap_or(self.audio_quality),
            audio_encoding: options.audio_encoding.unwrap_or(self.audio_encoding),
            output_format: options.output_format.unwrap_or(self.output_format),
            metering_enabled: options.metering_enabled.unwrap_or(self.metering_enabled),
            measurement_mode: options.measurement_mode.unwrap_or(self.measurement_mode),
            audio_encoding_bit_rate: options
                .audio_encoding_bit_rate
                .unwrap_or(self.audio_encoding_bit_rate),
            include_base64: options.include_base64.unwrap_or(self.include_base64),
            audio_source: options.audio_source.unwrap_or(self.audio_source),
            should_resume: options.should_resume.unwrap_or(self.should_resume),
            extra,
        }
    }

    pub fn validate(&self) -> BridgeResult<()> {
        if !self.sample_rate.is_finite() || self.sample_rate < 0.0 {
            return Err(BridgeError::invalid_option(
                "SampleRate",
                format!("must be a finite, non-negative number (got {})", self.sample_rate),
            ));
        }
        if !matches!(self.channels, 1 | 2) {
            return Err(BridgeError::invalid_option(
                "Channels",
                format!("must be 1 or 2 (got {})", self.channels),
            ));
        }
        if self.audio_encoding_bit_rate < 0 {
            return Err(BridgeError::invalid_option(
                "AudioEncodingBitRate",
                format!("must be non-negative (got {})", self.audio_encoding_bit_rate),
            ));
        }
        if self.audio_source > audio_source::UNPROCESSED {
            return Err(BridgeError::invalid_option(
                "AudioSource",
                format!("unknown source selector {}", self.audio_source),
            ));
        }
        Ok(())
    }
}

impl From<RecordingSettings> for RecordingOptions {
    fn from(s: RecordingSettings) -> Self {
        Self {
            sample_rate: Some(s.sample_rate),
            channels: Some(s.channels),
            audio_quality: Some(s.audio_quality),
            audio_encoding: Some(s.audio_encoding),
            output_format: Some(s.output_format),
            metering_enabled: Some(s.metering_enabled),
            measurement_mode: Some(s.measurement_mode),
            audio_encoding_bit_rate: Some(s.audio_encoding_bit_rate),
            include_base64: Some(s.include_base64),
            audio_source: Some(s.audio_source),
            should_resume: Some(s.should_resume),
            extra: s.extra,
        }
    }
}
