//! Synchronous publish/subscribe bus for session events.
//!
//! Subscribers run on the publishing thread, in registration order. A
//! subscriber that returns an error or panics is logged and skipped; delivery
//! to the rest continues and the publisher never sees the failure.

use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;
use tracing::{error, warn};

use crate::state::User;

/// How a channel line came about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Message,
    Action,
    Notice,
    Join,
    Part,
    Quit,
    Nick,
    Other,
}

impl LineKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LineKind::Message => "message",
            LineKind::Action => "action",
            LineKind::Notice => "notice",
            LineKind::Join => "join",
            LineKind::Part => "part",
            LineKind::Quit => "quit",
            LineKind::Nick => "nick",
            LineKind::Other => "other",
        }
    }
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event published by the session engine.
///
/// Users are carried as snapshots taken at publish time. New variants may be
/// added; match with a wildcard arm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
#[non_exhaustive]
pub enum Event {
    /// The session first saw a user, from any line that names one.
    NewUser { user: User },
    /// A line was said (or done) in a channel.
    NewLine {
        user: User,
        channel: String,
        kind: LineKind,
        content: String,
    },
    /// The session learned about a channel.
    NewChannel { channel: String },
    /// A user entered a channel.
    NewMembership { user: User, channel: String },
    /// A user left a channel.
    DeletedMembership { user: User, channel: String },
    /// Registration completed with this server.
    NewServer { server: String },
    /// A member of `channel` changed nick; `user` carries the new nick.
    #[serde(rename_all = "camelCase")]
    NickChange {
        user: User,
        old_nick: String,
        channel: String,
    },
    /// The full message of the day.
    Motd { text: String },
    /// Every inbound command, handled or not.
    Command {
        command: String,
        prefix: Option<String>,
        params: Vec<String>,
    },
}

/// Discriminant of [`Event`], used as the subscription key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum EventKind {
    NewUser,
    NewLine,
    NewChannel,
    NewMembership,
    DeletedMembership,
    NewServer,
    NickChange,
    Motd,
    Command,
}

impl EventKind {
    /// Wire-stable name, e.g. `new-membership`.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::NewUser => "new-user",
            EventKind::NewLine => "new-line",
            EventKind::NewChannel => "new-channel",
            EventKind::NewMembership => "new-membership",
            EventKind::DeletedMembership => "deleted-membership",
            EventKind::NewServer => "new-server",
            EventKind::NickChange => "nick-change",
            EventKind::Motd => "motd",
            EventKind::Command => "command",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::NewUser { .. } => EventKind::NewUser,
            Event::NewLine { .. } => EventKind::NewLine,
            Event::NewChannel { .. } => EventKind::NewChannel,
            Event::NewMembership { .. } => EventKind::NewMembership,
            Event::DeletedMembership { .. } => EventKind::DeletedMembership,
            Event::NewServer { .. } => EventKind::NewServer,
            Event::NickChange { .. } => EventKind::NickChange,
            Event::Motd { .. } => EventKind::Motd,
            Event::Command { .. } => EventKind::Command,
        }
    }
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A subscriber callback.
pub type Subscriber = Arc<dyn Fn(&Event) -> anyhow::Result<()> + Send + Sync>;

/// Fan-out of events to subscribers, keyed by [`EventKind`].
#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    subscribers: RwLock<HashMap<EventKind, Vec<(SubscriptionId, Subscriber)>>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self.subscribers.read();
        let counts: HashMap<_, _> = subscribers.iter().map(|(k, v)| (*k, v.len())).collect();
        f.debug_struct("EventBus").field("subscribers", &counts).finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for one kind of event.
    pub fn subscribe<F>(&self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: Fn(&Event) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .write()
            .entry(kind)
            .or_default()
            .push((id, Arc::new(callback)));
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let Some(list) = subscribers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(sid, _)| *sid != id);
        before != list.len()
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.read().get(&kind).map_or(0, Vec::len)
    }

    /// Deliver an event to every current subscriber of its kind.
    ///
    /// Returns how many subscribers completed without error. The subscriber
    /// list is snapshotted first, so callbacks may subscribe or unsubscribe.
    pub fn publish(&self, event: &Event) -> usize {
        let kind = event.kind();
        let snapshot: Vec<(SubscriptionId, Subscriber)> = match self.subscribers.read().get(&kind) {
            Some(list) => list.clone(),
            None => return 0,
        };

        let mut delivered = 0;
        for (id, subscriber) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| subscriber(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    warn!(event = %kind, subscription = id.0, error = %e, "Subscriber failed");
                }
                Err(panic) => {
                    let message = if let Some(s) = panic.downcast_ref::<String>() {
                        s.clone()
                    } else if let Some(s) = panic.downcast_ref::<&str>() {
                        s.to_string()
                    } else {
                        "unknown panic".to_string()
                    };
                    error!(event = %kind, subscription = id.0, panic = %message, "Subscriber panicked");
                }
            }
        }
        delivered
    }
}
