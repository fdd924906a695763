//! # possel-proto
//!
//! Sans-IO building blocks for an IRC client session.
//!
//! ## Features
//!
//! - Line splitting into `(prefix, command, params)` with trailing-parameter support
//! - The RFC 1459/2812 numeric reply catalog with symbolic names
//! - `nick!user@host` identity parsing
//! - Mode change strings and NAMES membership prefixes
//! - CTCP ACTION detection
//! - Optional Tokio line codec

#![deny(clippy::all)]
#![warn(missing_docs)]

//! ## Quick Start
//!
//! ```rust
//! use possel_proto::{response::resolve_command, Message};
//!
//! let msg: Message = ":irc.example.net 001 alice :Welcome".parse().unwrap();
//! assert_eq!(resolve_command(&msg.command).unwrap(), "RPL_WELCOME");
//!
//! let reply = Message::privmsg("#possel", "hello");
//! assert_eq!(reply.to_string(), "PRIVMSG #possel :hello");
//! ```

pub mod casemap;
pub mod chan;
pub mod ctcp;
pub mod error;
#[cfg(feature = "tokio")]
pub mod line;
pub mod message;
pub mod mode;
pub mod prefix;
pub mod response;

pub use self::casemap::Casemapping;
pub use self::chan::ChannelExt;
pub use self::ctcp::{action_body, Ctcp, CtcpKind};
pub use self::error::{IdentityFormatError, MessageParseError, ModeParseError, ProtocolError};
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::message::{parse_line, Message};
pub use self::mode::{parse_mode_changes, Direction, ModeChange, StatusModes};
pub use self::prefix::{parse_identity, Hostmask, Prefix};
pub use self::response::{resolve_command, Response};
