use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Audio session category requested from the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionCategory {
    #[serde(alias = "ambient")]
    Ambient,
    #[default]
    #[serde(alias = "soloAmbient")]
    SoloAmbient,
    #[serde(alias = "playback")]
    Playback,
    #[serde(alias = "record")]
    Record,
    #[serde(alias = "playAndRecord")]
    PlayAndRecord,
    #[serde(alias = "multiRoute")]
    MultiRoute,
}

/// Physical destination for playback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputRoute {
    /// Earpiece
    Phone,
    #[serde(rename = "Phone Speaker")]
    PhoneSpeaker,
    Bluetooth,
    Headphones,
}

impl OutputRoute {
    pub const ALL: [OutputRoute; 4] = [
        OutputRoute::Phone,
        OutputRoute::PhoneSpeaker,
        OutputRoute::Bluetooth,
        OutputRoute::Headphones,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Phone => "Phone",
            Self::PhoneSpeaker => "Phone Speaker",
            Self::Bluetooth => "Bluetooth",
            Self::Headphones => "Headphones",
        }
    }
}

impl fmt::Display for OutputRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for OutputRoute {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|route| route.key() == s)
            .ok_or_else(|| BridgeError::invalid_option("output", format!("unknown output route '{}'", s)))
    }
}

/// One entry of the output query: a route key and whether it is usable now
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDescriptor {
    pub key: String,
    pub available: bool,
}

/// Caller-supplied playback options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_category: Option<SessionCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_loops: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputRoute>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlaybackOptions {
    pub fn from_value(value: Value) -> BridgeResult<Self> {
        let value = match value {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        serde_json::from_value(value)
            .map_err(|e| BridgeError::invalid_option("PlaybackOptions", e.to_string()))
    }
}

/// Fully-resolved playback record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSettings {
    pub session_category: SessionCategory,
    /// Extra repetitions after the first pass; 0 plays once
    pub number_of_loops: i64,
    /// `None` leaves the current platform routing untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputRoute>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            session_category: SessionCategory::SoloAmbient,
            number_of_loops: 0,
            output: None,
            extra: Map::new(),
        }
    }
}

impl PlaybackSettings {
    pub fn merge(&self, options: &PlaybackOptions) -> Self {
        let mut extra = self.extra.clone();
        extra.extend(options.extra.iter().map(|(k, v)| (k.clone(), v.clone())));

        Self {
            session_category: options.session_category.unwrap_or(self.session_category),
            number_of_loops: options.number_of_loops.unwrap_or(self.number_of_loops),
            output: options.output.or(self.output),
            extra,
        }
    }

    pub fn validate(&self) -> BridgeResult<()> {
        if self.number_of_loops < 0 {
            return Err(BridgeError::invalid_option(
                "numberOfLoops",
                format!("must be non-negative (got {})", self.number_of_loops),
            ));
        }
        Ok(())
    }
}

impl From<PlaybackSettings> for PlaybackOptions {
    fn from(s: PlaybackSettings) -> Self {
        Self {
            session_category: Some(s.session_category),
            number_of_loops: Some(s.number_of_loops),
            output: s.output,
            extra: s.extra,
        }
    }
}
