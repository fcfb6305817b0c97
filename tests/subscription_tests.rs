// Integration tests for native event subscriptions
//
// A manager must never hold more than one listener per channel, and nothing
// emitted after it unbinds may reach its inbox.

use audio_session_bridge::native::{EventEmitter, EventKind};
use audio_session_bridge::{SessionKind, SubscriptionManager};
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_double_bind_keeps_one_listener_per_channel() {
    let emitter = Arc::new(EventEmitter::new());
    let mut manager = SubscriptionManager::new(SessionKind::Recorder, Arc::clone(&emitter));

    manager.bind();
    manager.bind();

    assert_eq!(emitter.listener_count("recordingProgress"), 1);
    assert_eq!(emitter.listener_count("recordingFinished"), 1);
    assert_eq!(manager.live_handles(), 2);
    assert_eq!(manager.releases(), 1, "second bind releases the first");

    // One emission lands in the inbox exactly once
    assert_eq!(emitter.emit("recordingProgress", json!({ "currentTime": 1.0 })), 1);
    assert_eq!(manager.drain().len(), 1);
}

#[test]
fn test_events_after_unbind_are_not_delivered() {
    let emitter = Arc::new(EventEmitter::new());
    let mut manager = SubscriptionManager::new(SessionKind::Player, Arc::clone(&emitter));

    manager.bind();
    manager.unbind();

    assert_eq!(emitter.emit("playerFinished", json!({ "status": "OK" })), 0);
    assert!(manager.drain().is_empty());
    assert!(!manager.is_bound());
    assert_eq!(emitter.listener_count("playerProgress"), 0);
    assert_eq!(emitter.listener_count("playerFinished"), 0);
}

#[test]
fn test_unbind_without_binding_is_a_no_op() {
    let emitter = Arc::new(EventEmitter::new());
    let mut manager = SubscriptionManager::new(SessionKind::Recorder, emitter);

    manager.unbind();
    manager.unbind();

    assert_eq!(manager.releases(), 0);
}

#[test]
fn test_bind_uses_channels_of_its_session_kind() {
    let emitter = Arc::new(EventEmitter::new());
    let mut recorder = SubscriptionManager::new(SessionKind::Recorder, Arc::clone(&emitter));
    let mut player = SubscriptionManager::new(SessionKind::Player, Arc::clone(&emitter));

    recorder.bind();
    player.bind();

    let channels: Vec<_> = recorder.handles().iter().map(|h| h.channel).collect();
    assert_eq!(channels, vec!["recordingProgress", "recordingFinished"]);

    emitter.emit("playerProgress", json!({ "currentTime": 0.5 }));
    assert!(recorder.drain().is_empty());

    let events = player.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Progress);
}
