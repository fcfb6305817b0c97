//! Native event subscriptions for one session kind
//!
//! A `SubscriptionManager` holds either no listeners or exactly one per
//! recognised event kind. Both listeners feed a single inbox so progress and
//! finished notifications keep their emission order. The owning session
//! drains the inbox under its own lock, either from the pump task spawned by
//! [`spawn_pump`] or inline while it is mid-command.

use crate::native::{EventEmitter, EventKind, ListenerId, NativeEvent};
use crate::session::SessionKind;
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// One live native listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionHandle {
    pub id: ListenerId,
    pub kind: EventKind,
    pub channel: &'static str,
}

pub struct SubscriptionManager {
    session: SessionKind,
    emitter: Arc<EventEmitter>,
    handles: Vec<SubscriptionHandle>,
    inbox: Option<mpsc::UnboundedReceiver<NativeEvent>>,
    pump: Option<JoinHandle<()>>,
    releases: u64,
}

impl SubscriptionManager {
    pub fn new(session: SessionKind, emitter: Arc<EventEmitter>) -> Self {
        Self {
            session,
            emitter,
            handles: Vec::new(),
            inbox: None,
            pump: None,
            releases: 0,
        }
    }

    /// Release any previous binding, then attach one listener per event kind
    ///
    /// The returned `Notify` is signalled on every delivery into the inbox.
    pub fn bind(&mut self) -> Arc<Notify> {
        self.unbind();

        let (tx, rx) = mpsc::unbounded_channel();
        let notify = Arc::new(Notify::new());

        for kind in EventKind::ALL {
            let channel = kind.channel(self.session);
            let id = self
                .emitter
                .add_listener(channel, kind, tx.clone(), Arc::clone(&notify));
            self.handles.push(SubscriptionHandle { id, kind, channel });
        }
        self.inbox = Some(rx);

        debug!("Bound {} {} subscription(s)", self.handles.len(), self.session);
        notify
    }

    /// Keep `task` alive for as long as the current binding
    pub fn attach_pump(&mut self, task: JoinHandle<()>) {
        if let Some(previous) = self.pump.replace(task) {
            previous.abort();
        }
    }

    /// Release every live listener; a no-op when nothing is bound
    ///
    /// Anything still queued in the inbox is discarded.
    pub fn unbind(&mut self) {
        if self.handles.is_empty() && self.inbox.is_none() && self.pump.is_none() {
            return;
        }

        for handle in self.handles.drain(..) {
            self.emitter.remove_listener(handle.id);
        }
        if let Some(mut inbox) = self.inbox.take() {
            inbox.close();
            let mut dropped = 0;
            while inbox.try_recv().is_ok() {
                dropped += 1;
            }
            if dropped > 0 {
                debug!("Discarded {} undelivered {} event(s)", dropped, self.session);
            }
        }
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }

        self.releases += 1;
        debug!("Unbound {} subscriptions", self.session);
    }

    /// Take every event queued so far, in emission order
    pub fn drain(&mut self) -> Vec<NativeEvent> {
        let mut events = Vec::new();
        if let Some(inbox) = self.inbox.as_mut() {
            while let Ok(event) = inbox.try_recv() {
                events.push(event);
            }
        }
        events
    }

    pub fn handles(&self) -> &[SubscriptionHandle] {
        &self.handles
    }

    pub fn live_handles(&self) -> usize {
        self.handles.len()
    }

    pub fn is_bound(&self) -> bool {
        !self.handles.is_empty()
    }

    /// How many times a binding has actually been released
    pub fn releases(&self) -> u64 {
        self.releases
    }
}

impl Drop for SubscriptionManager {
    fn drop(&mut self) {
        self.unbind();
    }
}

/// Session-side consumer of queued events
pub trait EventSink: Send + 'static {
    fn dispatch_pending(&mut self);
}

/// Spawn the task that wakes on `notify` and lets `target` drain its inbox
///
/// Holds only a weak reference, so the task never keeps a session alive.
pub fn spawn_pump<S: EventSink>(target: Weak<Mutex<S>>, notify: Arc<Notify>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            notify.notified().await;
            let Some(target) = target.upgrade() else {
                trace!("Session dropped; pump exiting");
                break;
            };
            let mut sink = target.lock().await;
            sink.dispatch_pending();
        }
    })
}
