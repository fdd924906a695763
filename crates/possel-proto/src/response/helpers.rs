//! Helper methods and trait implementations for IRC response codes.

use super::Response;
use std::str::FromStr;
use thiserror::Error;

impl Response {
    /// Returns the numeric code as u16
    #[inline]
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is an error response (4xx, 5xx)
    #[inline]
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.code())
    }

    /// Check if this is a connection registration response (001-099)
    #[inline]
    pub fn is_registration(&self) -> bool {
        self.code() < 100
    }

    /// Check if this is a command reply (200-399)
    #[inline]
    pub fn is_reply(&self) -> bool {
        (200..400).contains(&self.code())
    }
}

impl FromStr for Response {
    type Err = ParseResponseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u16 = s
            .parse()
            .map_err(|_| ParseResponseError::InvalidFormat(s.to_owned()))?;
        Response::from_code(code).ok_or(ParseResponseError::UnknownNumeric(code))
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.code())
    }
}

/// Error when resolving a numeric command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseResponseError {
    /// The string was not a valid three-digit number.
    #[error("invalid response code format: {0:?}")]
    InvalidFormat(String),
    /// The numeric code is not in the catalog.
    #[error("no numeric command found: '{0:03}'")]
    UnknownNumeric(u16),
}

/// Resolve a command token to its symbolic name.
///
/// All-decimal tokens are looked up in the numeric catalog (`"001"` becomes
/// `"RPL_WELCOME"`); anything else is already symbolic and returned as-is.
///
/// ```
/// use possel_proto::response::resolve_command;
///
/// assert_eq!(resolve_command("353").unwrap(), "RPL_NAMREPLY");
/// assert_eq!(resolve_command("PRIVMSG").unwrap(), "PRIVMSG");
/// assert!(resolve_command("999").is_err());
/// ```
pub fn resolve_command(token: &str) -> Result<&str, ParseResponseError> {
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        token.parse::<Response>().map(|response| response.name())
    } else {
        Ok(token)
    }
}
