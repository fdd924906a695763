//! IRC message prefixes and `nick!user@host` identities.
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format

mod identity;

pub use self::identity::{nick_of, parse_identity, Hostmask};

use std::fmt;

/// Origin of a line: either a server or a user identity.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Prefix {
    /// Server name (e.g., "irc.example.com")
    ServerName(String),
    /// Full user identity
    User(Hostmask),
}

impl Prefix {
    /// Classify a raw prefix string.
    ///
    /// Anything that parses as `nick!user@host` is a user; everything else
    /// (including a bare nick) is treated as a server name.
    pub fn new_from_str(s: &str) -> Self {
        match parse_identity(s) {
            Ok(mask) => Prefix::User(mask),
            Err(_) => Prefix::ServerName(s.to_owned()),
        }
    }

    /// Get the nickname if this is a user prefix.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Prefix::User(mask) => Some(&mask.nick),
            Prefix::ServerName(_) => None,
        }
    }

    /// Whether the line came from a server rather than a user.
    pub fn is_server(&self) -> bool {
        matches!(self, Prefix::ServerName(_))
    }
}

impl From<&str> for Prefix {
    fn from(s: &str) -> Self {
        Prefix::new_from_str(s)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => f.write_str(name),
            Prefix::User(mask) => write!(f, "{}", mask),
        }
    }
}
