// Integration tests for option normalization
//
// Covers default merging, validation failures, and the two native argument
// conventions.

use anyhow::Result;
use audio_session_bridge::options::{AudioEncoding, AudioQuality, OutputFormat, SessionCategory};
use audio_session_bridge::{
    BridgeError, CallConvention, NativeCallArgs, OptionNormalizer, OutputRoute, PlaybackOptions,
    RecordingOptions, RecordingSettings, SessionKind,
};
use serde_json::json;

#[test]
fn test_partial_recording_options_keep_remaining_defaults() -> Result<()> {
    let normalizer = OptionNormalizer::new(CallConvention::OptionRecord);
    let options = RecordingOptions::from_value(json!({ "SampleRate": 22050, "Channels": 1 }))?;

    let normalized = normalizer.recording("/tmp/take.aac", &options)?;
    let settings = normalized.settings;

    assert_eq!(settings.sample_rate, 22050.0);
    assert_eq!(settings.channels, 1);
    assert_eq!(settings.audio_quality, AudioQuality::High);
    assert_eq!(settings.audio_encoding, AudioEncoding::Ima4);
    assert_eq!(settings.output_format, OutputFormat::Mpeg4);
    assert_eq!(settings.audio_encoding_bit_rate, 32000);
    assert!(!settings.metering_enabled);
    assert!(!settings.include_base64);
    assert!(settings.should_resume);

    match normalized.call {
        NativeCallArgs::PathAndRecord { path, options } => {
            assert_eq!(path, "/tmp/take.aac");
            assert_eq!(options["SampleRate"], json!(22050.0));
            assert_eq!(options["Channels"], json!(1));
            assert_eq!(options["AudioEncoding"], json!("ima4"));
            assert_eq!(options["OutputFormat"], json!("mpeg_4"));
        }
        other => panic!("expected path + record, got {:?}", other),
    }

    Ok(())
}

#[test]
fn test_normalizing_merged_settings_is_a_no_op() -> Result<()> {
    let normalizer = OptionNormalizer::new(CallConvention::OptionRecord);
    let options = RecordingOptions::from_value(json!({
        "SampleRate": 16000,
        "AudioQuality": "Low",
        "MeteringEnabled": true,
    }))?;

    let once = normalizer.recording("/tmp/a.aac", &options)?;
    let twice = normalizer.recording("/tmp/a.aac", &once.settings.clone().into())?;

    assert_eq!(once, twice);
    Ok(())
}

#[test]
fn test_empty_options_resolve_to_documented_defaults() -> Result<()> {
    let normalizer = OptionNormalizer::new(CallConvention::OptionRecord);

    let normalized = normalizer.recording("/tmp/a.aac", &RecordingOptions::from_value(json!({}))?)?;
    assert_eq!(normalized.settings, RecordingSettings::default());

    let null = normalizer.recording("/tmp/a.aac", &RecordingOptions::from_value(json!(null))?)?;
    assert_eq!(null.settings, RecordingSettings::default());

    Ok(())
}

#[test]
fn test_non_finite_sample_rate_is_rejected() {
    let normalizer = OptionNormalizer::new(CallConvention::Positional);
    let options = RecordingOptions {
        sample_rate: Some(f64::NAN),
        ..Default::default()
    };

    let err = normalizer.recording("/tmp/a.caf", &options).unwrap_err();
    assert!(
        matches!(&err, BridgeError::InvalidOption { field, .. } if field == "SampleRate"),
        "unexpected error: {:?}",
        err
    );
}

#[test]
fn test_out_of_range_values_are_rejected() {
    let normalizer = OptionNormalizer::new(CallConvention::OptionRecord);

    let negative_rate = RecordingOptions {
        sample_rate: Some(-8000.0),
        ..Default::default()
    };
    assert!(matches!(
        normalizer.recording("/tmp/a.aac", &negative_rate),
        Err(BridgeError::InvalidOption { .. })
    ));

    let three_channels = RecordingOptions {
        channels: Some(3),
        ..Default::default()
    };
    assert!(matches!(
        normalizer.recording("/tmp/a.aac", &three_channels),
        Err(BridgeError::InvalidOption { .. })
    ));

    let negative_bit_rate = RecordingOptions {
        audio_encoding_bit_rate: Some(-1),
        ..Default::default()
    };
    assert!(matches!(
        normalizer.recording("/tmp/a.aac", &negative_bit_rate),
        Err(BridgeError::InvalidOption { .. })
    ));

    // The JSON entry point rejects negative channel counts while parsing
    assert!(matches!(
        RecordingOptions::from_value(json!({ "Channels": -1 })),
        Err(BridgeError::InvalidOption { .. })
    ));
}

#[test]
fn test_unknown_enum_values_are_rejected() {
    for bad in [
        json!({ "AudioEncoding": "flac" }),
        json!({ "AudioQuality": "Ultra" }),
        json!({ "OutputFormat": "ogg" }),
    ] {
        let err = RecordingOptions::from_value(bad.clone()).unwrap_err();
        assert!(
            matches!(err, BridgeError::InvalidOption { .. }),
            "{} should be rejected",
            bad
        );
    }

    assert!(matches!(
        PlaybackOptions::from_value(json!({ "output": "Car Stereo" })),
        Err(BridgeError::InvalidOption { .. })
    ));
}

#[test]
fn test_unrecognised_fields_pass_through() -> Result<()> {
    let normalizer = OptionNormalizer::new(CallConvention::OptionRecord);
    let options = RecordingOptions::from_value(json!({
        "SampleRate": 8000,
        "AVFormatIDKey": "custom",
        "Nested": { "a": 1 },
    }))?;

    let normalized = normalizer.recording("/tmp/a.aac", &options)?;
    let NativeCallArgs::PathAndRecord { options: record, .. } = normalized.call else {
        panic!("expected path + record");
    };

    assert_eq!(record["AVFormatIDKey"], json!("custom"));
    assert_eq!(record["Nested"], json!({ "a": 1 }));
    assert_eq!(normalized.settings.extra["AVFormatIDKey"], json!("custom"));
    Ok(())
}

#[test]
fn test_positional_convention_drops_non_positional_fields() -> Result<()> {
    let normalizer = OptionNormalizer::new(CallConvention::Positional);
    let call = normalizer.normalize(
        SessionKind::Recorder,
        "/tmp/take.caf",
        json!({ "SampleRate": 22050, "Channels": 1, "IncludeBase64": true }),
    )?;

    assert_eq!(
        call,
        NativeCallArgs::Positional(vec![
            json!("/tmp/take.caf"),
            json!(22050.0),
            json!(1),
            json!(0x60),
            json!(0x696D_6134u32),
            json!(false),
            json!(true),
        ])
    );
    Ok(())
}

#[test]
fn test_positional_quality_and_encoding_use_platform_constants() -> Result<()> {
    let normalizer = OptionNormalizer::new(CallConvention::Positional);
    let call = normalizer.normalize(
        SessionKind::Recorder,
        "/tmp/take.m4a",
        json!({ "AudioQuality": "Low", "AudioEncoding": "aac" }),
    )?;

    let NativeCallArgs::Positional(args) = call else {
        panic!("expected positional arguments");
    };
    assert_eq!(args[3], json!(AudioQuality::Low.ios_constant()));
    assert_eq!(args[4], json!(0x6161_6320u32), "'aac ' format id");
    assert_eq!(AudioEncoding::AmrWb.ios_format_id(), None);
    Ok(())
}

#[test]
fn test_empty_playback_options_use_defaults() -> Result<()> {
    let normalizer = OptionNormalizer::new(CallConvention::Positional);

    let normalized = normalizer.playback("/tmp/song.wav", &PlaybackOptions::from_value(json!({}))?)?;

    assert_eq!(normalized.settings.session_category, SessionCategory::SoloAmbient);
    assert_eq!(normalized.settings.number_of_loops, 0);
    assert_eq!(normalized.settings.output, None);
    assert_eq!(
        normalized.call,
        NativeCallArgs::PathAndRecord {
            path: "/tmp/song.wav".to_string(),
            options: json!({ "sessionCategory": "SoloAmbient", "numberOfLoops": 0 })
                .as_object()
                .cloned()
                .unwrap_or_default(),
        }
    );
    Ok(())
}

#[test]
fn test_playback_options_parse_route_and_loops() -> Result<()> {
    let normalizer = OptionNormalizer::new(CallConvention::OptionRecord);
    let options = PlaybackOptions::from_value(json!({
        "sessionCategory": "Playback",
        "numberOfLoops": 2,
        "output": "Phone Speaker",
    }))?;

    let settings = normalizer.playback("/tmp/song.wav", &options)?.settings;

    assert_eq!(settings.session_category, SessionCategory::Playback);
    assert_eq!(settings.number_of_loops, 2);
    assert_eq!(settings.output, Some(OutputRoute::PhoneSpeaker));
    Ok(())
}

#[test]
fn test_negative_loop_count_is_rejected() {
    let normalizer = OptionNormalizer::new(CallConvention::OptionRecord);
    let options = PlaybackOptions {
        number_of_loops: Some(-1),
        ..Default::default()
    };

    assert!(matches!(
        normalizer.playback("/tmp/song.wav", &options),
        Err(BridgeError::InvalidOption { .. })
    ));
}
