//! Error taxonomy for the session engine.
//!
//! Nothing here is fatal to the process. Each error aborts the processing
//! of one inbound line or one outbound operation; the adapter decides
//! whether the connection survives.

use possel_proto::{IdentityFormatError, Message, MessageParseError, ModeParseError};
use thiserror::Error;
use tokio::sync::mpsc;

// ============================================================================
// Registry Errors
// ============================================================================

/// Channel membership violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("{nick} is already a member of {channel}")]
    UserAlreadyExists { nick: String, channel: String },

    #[error("{nick} is not a member of {channel}")]
    UserNotFound { nick: String, channel: String },
}

/// User registry violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no such user: {0}")]
    UserNotFound(String),

    #[error("nickname held by this session: {0}")]
    NickInUse(String),
}

// ============================================================================
// Session Errors (line dispatch and outbound operations)
// ============================================================================

/// Errors raised while handling one line or one outbound operation.
#[derive(Debug, Error)]
#[allow(clippy::large_enum_variant)] // Send carries the unsent Message
pub enum SessionError {
    #[error(transparent)]
    Identity(#[from] IdentityFormatError),

    #[error(transparent)]
    Mode(#[from] ModeParseError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("{command}: expected at least {expected} parameters, got {got}")]
    NeedMoreParams {
        command: &'static str,
        expected: usize,
        got: usize,
    },

    /// An outbound message would not go out as exactly one line.
    #[error("invalid outbound message: {0}")]
    InvalidOutbound(#[from] MessageParseError),

    #[error("outbound queue closed")]
    Send(#[from] mpsc::error::SendError<Message>),
}

impl SessionError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Identity(_) => "identity_format",
            Self::Mode(_) => "unknown_mode_command",
            Self::Channel(ChannelError::UserAlreadyExists { .. }) => "user_already_exists",
            Self::Channel(ChannelError::UserNotFound { .. }) => "user_not_found",
            Self::Registry(RegistryError::UserNotFound(_)) => "user_not_found",
            Self::Registry(RegistryError::NickInUse(_)) => "nick_in_use",
            Self::NeedMoreParams { .. } => "need_more_params",
            Self::InvalidOutbound(_) => "invalid_parameter",
            Self::Send(_) => "send_error",
        }
    }
}

/// The session's command queue has been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("session closed")]
pub struct SessionClosed;

/// Result type for handlers and outbound operations.
pub type SessionResult<T = ()> = Result<T, SessionError>;
