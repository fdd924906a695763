use std::fmt;

use crate::error::IdentityFormatError;

/// A fully qualified user identity.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hostmask {
    /// Nickname.
    pub nick: String,
    /// Username (ident), without the `~` no-identd marker.
    pub username: String,
    /// Hostname.
    pub host: String,
}

impl fmt::Display for Hostmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}@{}", self.nick, self.username, self.host)
    }
}

/// Parse a `nick!user@host` identity.
///
/// A leading `~` on the username (set by servers when identd did not answer)
/// is stripped.
///
/// ```
/// use possel_proto::prefix::parse_identity;
///
/// let mask = parse_identity("alice!~a@example.org").unwrap();
/// assert_eq!(mask.nick, "alice");
/// assert_eq!(mask.username, "a");
/// assert_eq!(mask.host, "example.org");
///
/// assert!(parse_identity("irc.example.org").is_err());
/// ```
pub fn parse_identity(s: &str) -> Result<Hostmask, IdentityFormatError> {
    let malformed = || IdentityFormatError(s.to_owned());

    let (nick, rest) = s.split_once('!').ok_or_else(malformed)?;
    let (username, host) = rest.split_once('@').ok_or_else(malformed)?;
    if nick.is_empty() {
        return Err(malformed());
    }

    Ok(Hostmask {
        nick: nick.to_owned(),
        username: username.strip_prefix('~').unwrap_or(username).to_owned(),
        host: host.to_owned(),
    })
}

/// The nickname part of a prefix: everything before the first `!`.
#[inline]
pub fn nick_of(prefix: &str) -> &str {
    prefix.split('!').next().unwrap_or(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_plain_username() {
        let mask = parse_identity("bob!b@h").unwrap();
        assert_eq!(
            mask,
            Hostmask {
                nick: "bob".into(),
                username: "b".into(),
                host: "h".into(),
            }
        );
    }

    #[test]
    fn strips_only_one_tilde() {
        let mask = parse_identity("bob!~~b@h").unwrap();
        assert_eq!(mask.username, "~b");
    }

    #[test]
    fn rejects_missing_parts() {
        assert!(parse_identity("bob").is_err());
        assert!(parse_identity("bob!b").is_err());
        assert!(parse_identity("bob@h").is_err());
        assert!(parse_identity("!b@h").is_err());
    }

    #[test]
    fn nick_of_handles_bare_nicks() {
        assert_eq!(nick_of("bob!b@h"), "bob");
        assert_eq!(nick_of("bob"), "bob");
        assert_eq!(nick_of(""), "");
    }
}
