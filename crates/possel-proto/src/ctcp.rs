//! CTCP (Client-to-Client Protocol) message handling.
//!
//! CTCP messages are embedded within PRIVMSG and NOTICE bodies using the
//! `\x01` delimiter character.
//!
//! # Reference
//! - CTCP specification: <https://modern.ircdocs.horse/ctcp.html>
//!
//! # Example
//!
//! ```
//! use possel_proto::ctcp::{Ctcp, CtcpKind};
//!
//! let ctcp = Ctcp::parse("\x01ACTION waves hello\x01").unwrap();
//! assert_eq!(ctcp.kind, CtcpKind::Action);
//! assert_eq!(ctcp.params, Some("waves hello"));
//!
//! let action = Ctcp::action("dances");
//! assert_eq!(action.to_string(), "\x01ACTION dances\x01");
//! ```

use std::fmt;

/// The CTCP delimiter character (`\x01`).
pub const CTCP_DELIM: char = '\x01';

const ACTION_OPEN: &str = "\x01ACTION ";

/// Known CTCP command types.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CtcpKind {
    /// ACTION - describes an action performed by the user (`/me`).
    Action,
    /// VERSION - requests client version information.
    Version,
    /// PING - measures round-trip latency.
    Ping,
    /// TIME - requests local time from the client.
    Time,
    /// Unknown or custom CTCP command.
    Unknown(String),
}

impl CtcpKind {
    /// Parse a CTCP command name into a `CtcpKind`.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "ACTION" => Self::Action,
            "VERSION" => Self::Version,
            "PING" => Self::Ping,
            "TIME" => Self::Time,
            _ => Self::Unknown(name.to_owned()),
        }
    }

    /// Returns the canonical uppercase name of this CTCP command.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Action => "ACTION",
            Self::Version => "VERSION",
            Self::Ping => "PING",
            Self::Time => "TIME",
            Self::Unknown(s) => s,
        }
    }
}

impl fmt::Display for CtcpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed CTCP message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ctcp<'a> {
    /// The CTCP command type.
    pub kind: CtcpKind,
    /// Optional parameters following the command.
    pub params: Option<&'a str>,
}

impl<'a> Ctcp<'a> {
    /// Parse a CTCP message from a PRIVMSG/NOTICE body.
    ///
    /// Lenient: the closing delimiter is optional and the command is
    /// case-insensitive. Returns `None` if the body is not CTCP at all.
    pub fn parse(text: &'a str) -> Option<Self> {
        let text = text.strip_prefix(CTCP_DELIM)?;
        let text = text.strip_suffix(CTCP_DELIM).unwrap_or(text);

        if text.is_empty() {
            return None;
        }

        let (command, params) = match text.split_once(' ') {
            Some((command, params)) if !params.is_empty() => (command, Some(params)),
            Some((command, _)) => (command, None),
            None => (text, None),
        };

        Some(Self {
            kind: CtcpKind::parse(command),
            params,
        })
    }

    /// Check if a message body starts like a CTCP message.
    #[inline]
    pub fn is_ctcp(text: &str) -> bool {
        text.starts_with(CTCP_DELIM)
    }

    /// Create an ACTION CTCP message.
    pub fn action(text: &'a str) -> Self {
        Self {
            kind: CtcpKind::Action,
            params: Some(text),
        }
    }
}

impl fmt::Display for Ctcp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CTCP_DELIM, self.kind)?;
        if let Some(params) = self.params {
            write!(f, " {}", params)?;
        }
        write!(f, "{}", CTCP_DELIM)
    }
}

/// Strict ACTION detection used for classifying channel lines.
///
/// The body must begin with exactly `\x01ACTION ` and end with `\x01`; both
/// markers are stripped. Anything else (lowercase `action`, a missing closing
/// delimiter, other CTCP commands) is not an action.
///
/// ```
/// use possel_proto::ctcp::action_body;
///
/// assert_eq!(action_body("\x01ACTION waves\x01"), Some("waves"));
/// assert_eq!(action_body("\x01ACTION waves"), None);
/// assert_eq!(action_body("waves"), None);
/// ```
pub fn action_body(text: &str) -> Option<&str> {
    text.strip_prefix(ACTION_OPEN)?.strip_suffix(CTCP_DELIM)
}
