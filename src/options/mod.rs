//! Option normalization
//!
//! Caller options are shallow-merged over the documented defaults and then
//! shaped into whichever argument convention the native surface expects.
//! Validation happens here, before any native call is made.

mod normalize;
mod playback;
mod recording;

pub use normalize::{CallConvention, NativeCallArgs, Normalized, OptionNormalizer, POSITIONAL_FIELDS};
pub use playback::{OutputDescriptor, OutputRoute, PlaybackOptions, PlaybackSettings, SessionCategory};
pub use recording::{
    audio_source, AudioEncoding, AudioQuality, OutputFormat, RecordingOptions, RecordingSettings,
};
