//! Channels and their membership.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::error::ChannelError;
use crate::events::LineKind;

use super::user::{User, UserId};

/// One entry of a channel's message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub speaker: UserId,
    pub kind: LineKind,
    pub content: String,
}

/// A channel the session has seen.
#[derive(Debug, Clone, Serialize)]
pub struct Channel {
    /// Name as first seen on the wire.
    pub name: String,
    members: HashSet<UserId>,
    messages: Vec<LogEntry>,
}

impl Channel {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            members: HashSet::new(),
            messages: Vec::new(),
        }
    }

    /// Add an explicitly joining user. Joining twice is an error.
    pub fn user_join(&mut self, user: &User) -> Result<(), ChannelError> {
        debug!(channel = %self.name, user = %user, "join");
        if !self.members.insert(user.id) {
            return Err(ChannelError::UserAlreadyExists {
                nick: user.nick.clone(),
                channel: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Add a member if absent. Returns whether the member was new.
    pub fn insert_member(&mut self, id: UserId) -> bool {
        self.members.insert(id)
    }

    /// Remove a parting user. Parting a non-member is an error.
    pub fn user_part(&mut self, user: &User) -> Result<(), ChannelError> {
        debug!(channel = %self.name, user = %user, "part");
        if !self.members.remove(&user.id) {
            return Err(ChannelError::UserNotFound {
                nick: user.nick.clone(),
                channel: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Swap one member handle for another, keeping set semantics.
    pub(crate) fn replace_member(&mut self, from: UserId, to: UserId) {
        if self.members.remove(&from) {
            self.members.insert(to);
        }
    }

    pub fn is_member(&self, id: UserId) -> bool {
        self.members.contains(&id)
    }

    pub fn members(&self) -> impl Iterator<Item = UserId> + '_ {
        self.members.iter().copied()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Append a line to the message log.
    pub fn record(&mut self, speaker: UserId, kind: LineKind, content: impl Into<String>) {
        self.messages.push(LogEntry {
            speaker,
            kind,
            content: content.into(),
        });
    }

    /// The append-only message log, oldest first.
    pub fn messages(&self) -> &[LogEntry] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: u64, nick: &str) -> User {
        User::nick_only(UserId(id), nick)
    }

    #[test]
    fn join_twice_fails() {
        let mut chan = Channel::new("#test");
        let alice = user(1, "alice");
        chan.user_join(&alice).unwrap();
        assert_eq!(
            chan.user_join(&alice),
            Err(ChannelError::UserAlreadyExists {
                nick: "alice".to_string(),
                channel: "#test".to_string(),
            })
        );
        assert_eq!(chan.member_count(), 1);
    }

    #[test]
    fn part_non_member_fails() {
        let mut chan = Channel::new("#test");
        assert!(matches!(
            chan.user_part(&user(2, "bob")),
            Err(ChannelError::UserNotFound { .. })
        ));
    }

    #[test]
    fn insert_member_is_idempotent() {
        let mut chan = Channel::new("#test");
        assert!(chan.insert_member(UserId(1)));
        assert!(!chan.insert_member(UserId(1)));
        assert_eq!(chan.member_count(), 1);
    }

    #[test]
    fn replace_member_merges() {
        let mut chan = Channel::new("#test");
        chan.insert_member(UserId(1));
        chan.insert_member(UserId(2));
        chan.replace_member(UserId(2), UserId(1));
        assert_eq!(chan.member_count(), 1);
        assert!(chan.is_member(UserId(1)));

        chan.replace_member(UserId(9), UserId(3));
        assert!(!chan.is_member(UserId(3)));
    }

    #[test]
    fn log_is_ordered() {
        let mut chan = Channel::new("#test");
        chan.record(UserId(1), LineKind::Message, "first");
        chan.record(UserId(2), LineKind::Action, "second");
        let contents: Vec<_> = chan.messages().iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, ["first", "second"]);
    }
}
