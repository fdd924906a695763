//! The per-connection session engine.
//!
//! [`SessionEngine`] is sans-IO: it consumes raw inbound lines, keeps the
//! user and channel registries current, publishes [`Event`]s and pushes
//! outbound [`Message`]s onto an unbounded queue the adapter drains. All
//! state mutation happens on the single thread that calls
//! [`SessionEngine::handle_line`] and [`SessionEngine::apply`].

mod handlers;
mod outbound;

pub use outbound::{SessionCommand, SessionHandle};

use std::collections::HashMap;
use std::sync::Arc;

use possel_proto::{Message, StatusModes, parse_line, resolve_command};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::{IdentityConfig, SessionConfig};
use crate::error::SessionResult;
use crate::events::{Event, EventBus, LineKind};
use crate::state::{ChannelRegistry, User, UserId, UserRegistry};
use crate::telemetry::spans;

/// Where the session is in the registration handshake.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Disconnected,
    /// NICK and USER have been sent.
    Registering,
    /// RPL_WELCOME has been received.
    Registered,
}

type HandlerFn = fn(&mut SessionEngine, &Message) -> SessionResult;

/// Protocol state for one connection to one server.
pub struct SessionEngine {
    state: SessionState,
    identity: IdentityConfig,
    config: SessionConfig,
    users: UserRegistry,
    channels: ChannelRegistry,
    motd: String,
    server: Option<String>,
    status: StatusModes,
    bus: Arc<EventBus>,
    outbound: mpsc::UnboundedSender<Message>,
    handlers: HashMap<&'static str, HandlerFn>,
}

impl SessionEngine {
    /// Create an engine that writes outbound lines to `outbound`.
    pub fn new(
        identity: IdentityConfig,
        config: SessionConfig,
        outbound: mpsc::UnboundedSender<Message>,
    ) -> Self {
        let users = UserRegistry::new(
            config.casemapping,
            &identity.nick,
            identity.username(),
            identity.realname(),
        );
        let channels = ChannelRegistry::new(config.casemapping);

        Self {
            state: SessionState::Disconnected,
            identity,
            config,
            users,
            channels,
            motd: String::new(),
            server: None,
            status: StatusModes::default(),
            bus: Arc::new(EventBus::new()),
            outbound,
            handlers: handlers::table(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn identity(&self) -> &IdentityConfig {
        &self.identity
    }

    /// The nick the session currently holds.
    pub fn nick(&self) -> &str {
        &self.users.own().nick
    }

    pub fn users(&self) -> &UserRegistry {
        &self.users
    }

    pub fn channels(&self) -> &ChannelRegistry {
        &self.channels
    }

    /// The event bus; clone the `Arc` to subscribe from elsewhere.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// The most recently completed (or in-progress) MOTD.
    pub fn motd(&self) -> &str {
        &self.motd
    }

    /// Name of the server that welcomed us.
    pub fn server(&self) -> Option<&str> {
        self.server.as_deref()
    }

    /// Member status modes in effect, from ISUPPORT `PREFIX` once seen.
    pub fn status_modes(&self) -> &StatusModes {
        &self.status
    }

    /// Ingest one raw line as read from the wire.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    pub fn handle_bytes(&mut self, raw: &[u8]) -> SessionResult {
        self.handle_line(&String::from_utf8_lossy(raw))
    }

    /// Ingest one line.
    ///
    /// A line that cannot be parsed is logged and dropped. Errors from a
    /// handler abandon that line only; the session stays usable.
    pub fn handle_line(&mut self, raw: &str) -> SessionResult {
        let msg = match parse_line(raw) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(line = %raw.trim_end(), error = %e, "Dropping malformed line");
                return Ok(());
            }
        };
        self.dispatch(&msg)
    }

    /// Route a parsed message to its handler, then publish it as a raw
    /// [`Event::Command`].
    pub fn dispatch(&mut self, msg: &Message) -> SessionResult {
        let command = match resolve_command(&msg.command) {
            Ok(name) => name.to_ascii_uppercase(),
            Err(e) => {
                debug!(error = %e, "Numeric not in catalog");
                msg.command.clone()
            }
        };

        let span = spans::command(&command, msg.source());
        let _enter = span.enter();

        match self.handlers.get(command.as_str()).copied() {
            Some(handler) => handler(self, msg)?,
            None => self.log_unhandled(&command, msg),
        }

        self.bus.publish(&Event::Command {
            command,
            prefix: msg.prefix.clone(),
            params: msg.params.clone(),
        });
        Ok(())
    }

    fn log_unhandled(&self, command: &str, msg: &Message) {
        debug!(
            command = %command,
            prefix = %msg.source(),
            params = ?msg.params,
            "Unhandled command"
        );
    }

    // ------------------------------------------------------------------
    // Shared helpers for handlers and outbound operations
    // ------------------------------------------------------------------

    fn publish(&self, event: Event) {
        self.bus.publish(&event);
    }

    fn snapshot(&self, id: UserId) -> Option<User> {
        self.users.get(id).cloned()
    }

    /// Resolve a full prefix, announcing the user if it is new.
    fn resolve_full(&mut self, prefix: &str) -> SessionResult<UserId> {
        let resolved = self.users.get_or_create_full(prefix)?;
        if resolved.created {
            self.announce_user(resolved.id);
        }
        Ok(resolved.id)
    }

    /// Resolve a bare nick, announcing the user if it is new.
    fn resolve_nick(&mut self, nick: &str) -> UserId {
        let resolved = self.users.get_or_create_by_nick(nick);
        if resolved.created {
            self.announce_user(resolved.id);
        }
        resolved.id
    }

    fn announce_user(&self, id: UserId) {
        if let Some(user) = self.snapshot(id) {
            self.publish(Event::NewUser { user });
        }
    }

    /// Hand a user displaced by a rename over to the one that took its nick.
    fn merge_displaced(&mut self, displaced: Option<User>, into: UserId) {
        if let Some(displaced) = displaced {
            debug!(nick = %displaced.nick, "Merging displaced user");
            for chan in self.channels.iter_mut() {
                chan.replace_member(displaced.id, into);
            }
        }
    }

    /// Make sure a channel exists, announcing it if it is new.
    fn ensure_channel(&mut self, name: &str) {
        let (_, created) = self.channels.get_or_create(name);
        if created {
            debug!(channel = %name, "new channel");
            self.publish(Event::NewChannel {
                channel: name.to_owned(),
            });
        }
    }

    /// Append a line to a channel's log and publish it.
    fn channel_line(&mut self, speaker: UserId, channel: &str, kind: LineKind, content: &str) {
        self.ensure_channel(channel);
        let (chan, _) = self.channels.get_or_create(channel);
        chan.record(speaker, kind, content);
        let channel = chan.name.clone();

        if let Some(user) = self.snapshot(speaker) {
            self.publish(Event::NewLine {
                user,
                channel,
                kind,
                content: content.to_owned(),
            });
        }
    }
}

impl std::fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine")
            .field("state", &self.state)
            .field("nick", &self.nick())
            .field("users", &self.users.len())
            .field("channels", &self.channels.len())
            .field("server", &self.server)
            .finish()
    }
}
