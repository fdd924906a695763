//! Lazy-creation registries for users and channels.
//!
//! Both registries own their entities outright. Everything else refers to a
//! user by [`UserId`] and to a channel by its folded name.

use std::collections::HashMap;

use possel_proto::{parse_identity, Casemapping, IdentityFormatError};
use tracing::debug;

use crate::error::RegistryError;

use super::channel::Channel;
use super::user::{User, UserId};

/// Outcome of a get-or-create lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolved {
    pub id: UserId,
    pub created: bool,
}

/// All users known to one session, unique by folded nick.
#[derive(Debug)]
pub struct UserRegistry {
    casemap: Casemapping,
    next_id: u64,
    own: UserId,
    users: HashMap<UserId, User>,
    /// folded nick -> id
    nicks: HashMap<String, UserId>,
}

impl UserRegistry {
    /// Create a registry holding only the session's own identity.
    pub fn new(casemap: Casemapping, nick: &str, username: &str, realname: &str) -> Self {
        let own = UserId(0);
        let mut me = User::nick_only(own, nick);
        me.username = username.to_owned();
        me.realname = realname.to_owned();

        let mut registry = Self {
            casemap,
            next_id: 1,
            own,
            users: HashMap::new(),
            nicks: HashMap::new(),
        };
        registry.nicks.insert(casemap.fold(nick), own);
        registry.users.insert(own, me);
        registry
    }

    /// The session's own identity.
    pub fn own_id(&self) -> UserId {
        self.own
    }

    pub fn own(&self) -> &User {
        // The own entry is inserted at construction and never removed.
        &self.users[&self.own]
    }

    pub fn is_own(&self, id: UserId) -> bool {
        id == self.own
    }

    pub fn get(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn get_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users.get_mut(&id)
    }

    /// Look up a user by nick without creating one.
    pub fn by_nick(&self, nick: &str) -> Option<UserId> {
        self.nicks.get(&self.casemap.fold(nick)).copied()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// Users ordered by folded nick.
    pub fn sorted(&self) -> Vec<&User> {
        let mut users: Vec<&User> = self.users.values().collect();
        users.sort_by_cached_key(|u| self.casemap.fold(&u.nick));
        users
    }

    fn allocate(&mut self, user: User) -> UserId {
        let id = user.id;
        self.nicks.insert(self.casemap.fold(&user.nick), id);
        self.users.insert(id, user);
        id
    }

    fn next_id(&mut self) -> UserId {
        let id = UserId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Return the user with this nick, creating a nick-only one if needed.
    pub fn get_or_create_by_nick(&mut self, nick: &str) -> Resolved {
        if let Some(id) = self.by_nick(nick) {
            return Resolved { id, created: false };
        }
        let id = self.next_id();
        self.allocate(User::nick_only(id, nick));
        debug!(nick = %nick, id = %id, "new nick-only user");
        Resolved { id, created: true }
    }

    /// Return the user named by a `nick!user@host` prefix.
    ///
    /// A nick-only user with the same nick is upgraded in place, so both
    /// lookup paths converge on one entity.
    pub fn get_or_create_full(&mut self, prefix: &str) -> Result<Resolved, IdentityFormatError> {
        let mask = parse_identity(prefix)?;

        if let Some(id) = self.by_nick(&mask.nick) {
            if let Some(user) = self.users.get_mut(&id) {
                if !user.fully_known {
                    user.username = mask.username;
                    user.host = Some(mask.host);
                    user.fully_known = true;
                }
            }
            return Ok(Resolved { id, created: false });
        }

        let id = self.next_id();
        let mut user = User::nick_only(id, &mask.nick);
        user.username = mask.username;
        user.host = Some(mask.host);
        user.fully_known = true;
        self.allocate(user);
        debug!(prefix = %prefix, id = %id, "new user");
        Ok(Resolved { id, created: true })
    }

    /// Move a user to a new nick.
    ///
    /// If another entity already holds `new`, the renamed user takes the nick
    /// over: the displaced entity is removed, its modes are folded into the
    /// renamed user, and it is returned so the caller can repoint channel
    /// memberships. The session's own identity can never be displaced.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<Option<User>, RegistryError> {
        let id = self
            .by_nick(old)
            .ok_or_else(|| RegistryError::UserNotFound(old.to_owned()))?;
        let new_key = self.casemap.fold(new);

        let displaced = match self.nicks.get(&new_key).copied() {
            Some(other) if other == id => None,
            Some(other) if other == self.own => {
                return Err(RegistryError::NickInUse(new.to_owned()));
            }
            Some(other) => self.users.remove(&other),
            None => None,
        };

        self.nicks.remove(&self.casemap.fold(old));
        self.nicks.insert(new_key, id);

        let user = self
            .users
            .get_mut(&id)
            .ok_or_else(|| RegistryError::UserNotFound(old.to_owned()))?;
        user.nick = new.to_owned();
        if let Some(other) = &displaced {
            user.absorb_modes(other.clone());
            debug!(nick = %new, displaced = %other.id, "rename displaced an existing user");
        }
        Ok(displaced)
    }
}

/// All channels known to one session, keyed by folded name.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    casemap: Casemapping,
    channels: HashMap<String, Channel>,
}

impl ChannelRegistry {
    pub fn new(casemap: Casemapping) -> Self {
        Self {
            casemap,
            channels: HashMap::new(),
        }
    }

    /// The key a channel name is stored under.
    pub fn key(&self, name: &str) -> String {
        self.casemap.fold(name)
    }

    /// Return the channel, creating it on first reference.
    ///
    /// The flag is true when the channel was just created.
    pub fn get_or_create(&mut self, name: &str) -> (&mut Channel, bool) {
        let key = self.casemap.fold(name);
        let created = !self.channels.contains_key(&key);
        let channel = self
            .channels
            .entry(key)
            .or_insert_with(|| Channel::new(name));
        (channel, created)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(&self.key(name))
    }

    pub fn get(&self, name: &str) -> Option<&Channel> {
        self.channels.get(&self.key(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Channel> {
        let key = self.key(name);
        self.channels.get_mut(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Channel> {
        self.channels.values_mut()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
