use crate::session::SessionKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Notify};
use tracing::trace;
use uuid::Uuid;

/// Recognised notification kinds per session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Progress,
    Finished,
}

impl EventKind {
    pub const ALL: [EventKind; 2] = [EventKind::Progress, EventKind::Finished];

    /// Native channel name for this event on a session kind
    pub fn channel(self, session: SessionKind) -> &'static str {
        match (session, self) {
            (SessionKind::Recorder, Self::Progress) => "recordingProgress",
            (SessionKind::Recorder, Self::Finished) => "recordingFinished",
            (SessionKind::Player, Self::Progress) => "playerProgress",
            (SessionKind::Player, Self::Finished) => "playerFinished",
        }
    }
}

/// One emission as seen by a listener
#[derive(Debug, Clone, PartialEq)]
pub struct NativeEvent {
    pub kind: EventKind,
    pub payload: Value,
}

pub type ListenerId = Uuid;

struct Listener {
    channel: String,
    kind: EventKind,
    tx: mpsc::UnboundedSender<NativeEvent>,
    notify: Arc<Notify>,
}

/// Named notification channels exposed by a native surface
///
/// `emit` fans a payload out to every listener currently attached to the
/// channel; nothing is retained for listeners attached later.
#[derive(Default)]
pub struct EventEmitter {
    listeners: Mutex<HashMap<ListenerId, Listener>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener; emissions are queued on `tx` and signalled on `notify`
    pub fn add_listener(
        &self,
        channel: &str,
        kind: EventKind,
        tx: mpsc::UnboundedSender<NativeEvent>,
        notify: Arc<Notify>,
    ) -> ListenerId {
        let id = Uuid::new_v4();
        let listener = Listener {
            channel: channel.to_string(),
            kind,
            tx,
            notify,
        };
        self.listeners
            .lock()
            .expect("emitter listeners mutex poisoned")
            .insert(id, listener);
        trace!("Listener {} added on {}", id, channel);
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.listeners
            .lock()
            .expect("emitter listeners mutex poisoned")
            .remove(&id)
            .is_some()
    }

    /// Deliver `payload` to the channel's listeners; returns how many received it
    pub fn emit(&self, channel: &str, payload: Value) -> usize {
        let listeners = self.listeners.lock().expect("emitter listeners mutex poisoned");
        let mut delivered = 0;
        for listener in listeners.values().filter(|l| l.channel == channel) {
            let event = NativeEvent {
                kind: listener.kind,
                payload: payload.clone(),
            };
            if listener.tx.send(event).is_ok() {
                listener.notify.notify_one();
                delivered += 1;
            }
        }
        trace!("Emitted {} to {} listener(s)", channel, delivered);
        delivered
    }

    pub fn listener_count(&self, channel: &str) -> usize {
        self.listeners
            .lock()
            .expect("emitter listeners mutex poisoned")
            .values()
            .filter(|l| l.channel == channel)
            .count()
    }
}
