//! Remote (and local) user identities.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use possel_proto::mode::{Direction, ModeChange};
use serde::Serialize;

/// Stable handle for a [`User`] within one session's registry.
///
/// Two handles compare equal exactly when they refer to the same entity,
/// regardless of how often that entity has been renamed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(pub(crate) u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// An identity observed on the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub nick: String,
    /// Defaults to the nick until a full prefix is seen.
    pub username: String,
    /// Defaults to the nick until a WHO reply is seen.
    pub realname: String,
    pub host: Option<String>,
    /// True once username and host came from a `nick!user@host` prefix.
    pub fully_known: bool,
    /// Channel modes, keyed by folded channel name.
    pub modes: HashMap<String, BTreeSet<char>>,
}

impl User {
    pub(crate) fn nick_only(id: UserId, nick: &str) -> Self {
        Self {
            id,
            nick: nick.to_owned(),
            username: nick.to_owned(),
            realname: nick.to_owned(),
            host: None,
            fully_known: false,
            modes: HashMap::new(),
        }
    }

    /// Modes held in one channel.
    pub fn modes_in(&self, channel_key: &str) -> Option<&BTreeSet<char>> {
        self.modes.get(channel_key)
    }

    /// Whether the user holds `mode` in the channel.
    pub fn has_mode(&self, channel_key: &str, mode: char) -> bool {
        self.modes_in(channel_key).is_some_and(|set| set.contains(&mode))
    }

    /// Apply a single `+x`/`-x` change to this user's modes in a channel.
    ///
    /// Returns whether anything changed; removing a mode the user does not
    /// hold is a no-op.
    pub fn apply_mode(&mut self, channel_key: &str, change: ModeChange) -> bool {
        match change.direction {
            Direction::Add => self
                .modes
                .entry(channel_key.to_owned())
                .or_default()
                .insert(change.mode),
            Direction::Remove => {
                let Some(set) = self.modes.get_mut(channel_key) else {
                    return false;
                };
                let removed = set.remove(&change.mode);
                if set.is_empty() {
                    self.modes.remove(channel_key);
                }
                removed
            }
        }
    }

    /// Fold another entity's channel modes into this one.
    pub(crate) fn absorb_modes(&mut self, other: User) {
        for (channel, modes) in other.modes {
            self.modes.entry(channel).or_default().extend(modes);
        }
    }
}

/// `nick!username +modes`, with `&` appended to the modes when fully known.
impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut modes: BTreeSet<char> = self.modes.values().flatten().copied().collect();
        if self.fully_known {
            modes.insert('&');
        }
        let modes: String = modes.into_iter().collect();
        write!(f, "{}!{} +{}", self.nick, self.username, modes)
    }
}
