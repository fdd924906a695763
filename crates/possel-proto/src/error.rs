//! Error types for the IRC protocol library.
//!
//! Every failure here is local to a single line or token: callers decide
//! whether to log and drop, or surface the error further up.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors raised by the line framer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Line exceeded the framer's maximum length.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    LineTooLong {
        /// Actual line length.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Outbound line would not survive framing as a single line.
    #[error("refusing to encode: {0}")]
    InvalidMessage(#[from] MessageParseError),
}

/// Errors encountered when splitting a raw line into prefix, command and params.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Line was empty (or only whitespace and line terminators).
    #[error("empty line")]
    EmptyLine,

    /// A prefix was present but nothing followed it.
    #[error("prefix without command: {0}")]
    MissingCommand(String),

    /// Command token contained characters outside `1*letter / 3digit`.
    #[error("invalid command token: {0}")]
    InvalidCommand(String),

    /// A parameter holds CR, LF or NUL and would split or truncate the line.
    #[error("parameter contains CR, LF or NUL: {0:?}")]
    InvalidParameter(String),
}

/// A prefix string that is not of the form `nick!user@host`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed identity {0:?}: expected nick!user@host")]
pub struct IdentityFormatError(pub String);

/// Errors encountered when parsing mode change strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ModeParseError {
    /// Direction character was neither `+` nor `-`.
    #[error("unknown mode command {command:?}: expected '+' or '-', got {modifier:?}")]
    UnknownModeCommand {
        /// The full mode string.
        command: String,
        /// The offending direction character.
        modifier: char,
    },

    /// Mode string was empty or only had a direction.
    #[error("mode string {0:?} carries no mode characters")]
    MissingMode(String),
}
