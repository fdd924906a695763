//! Shared harness for session integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use possel::{
    Event, EventKind, IdentityConfig, SessionConfig, SessionEngine, SessionError, UserId,
};
use possel_proto::Message;
use tokio::sync::mpsc;

pub const ALL_KINDS: [EventKind; 9] = [
    EventKind::NewUser,
    EventKind::NewLine,
    EventKind::NewChannel,
    EventKind::NewMembership,
    EventKind::DeletedMembership,
    EventKind::NewServer,
    EventKind::NickChange,
    EventKind::Motd,
    EventKind::Command,
];

/// A session engine with its outbound queue and every published event.
pub struct TestSession {
    pub engine: SessionEngine,
    outbound: mpsc::UnboundedReceiver<Message>,
    events: Arc<Mutex<Vec<Event>>>,
}

impl TestSession {
    /// Session for nick `possel` with default settings.
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let mut identity = IdentityConfig::new("possel");
        identity.realname = Some("Possel Client".to_string());

        let (tx, outbound) = mpsc::unbounded_channel();
        let engine = SessionEngine::new(identity, config, tx);

        let events = Arc::new(Mutex::new(Vec::new()));
        for kind in ALL_KINDS {
            let sink = events.clone();
            engine.events().subscribe(kind, move |event| {
                sink.lock().push(event.clone());
                Ok(())
            });
        }

        Self {
            engine,
            outbound,
            events,
        }
    }

    /// Feed one line, panicking on error.
    pub fn feed(&mut self, line: &str) {
        if let Err(e) = self.engine.handle_line(line) {
            panic!("line {line:?} failed: {e}");
        }
    }

    /// Feed one line and return the result.
    pub fn try_feed(&mut self, line: &str) -> Result<(), SessionError> {
        self.engine.handle_line(line)
    }

    /// Drain every outbound line, serialized.
    pub fn sent(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(msg) = self.outbound.try_recv() {
            lines.push(msg.to_string());
        }
        lines
    }

    /// Drain every published event except raw command echoes.
    pub fn events(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
            .into_iter()
            .filter(|e| e.kind() != EventKind::Command)
            .collect()
    }

    /// Drain every published event.
    pub fn all_events(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn id_of(&self, nick: &str) -> UserId {
        match self.engine.users().by_nick(nick) {
            Some(id) => id,
            None => panic!("no user {nick}"),
        }
    }

    /// Nicks of a channel's members, sorted.
    pub fn members(&self, channel: &str) -> Vec<String> {
        let Some(chan) = self.engine.channels().get(channel) else {
            return Vec::new();
        };
        let users = self.engine.users();
        let mut nicks: Vec<String> = chan
            .members()
            .filter_map(|id| users.get(id).map(|u| u.nick.clone()))
            .collect();
        nicks.sort();
        nicks
    }
}
