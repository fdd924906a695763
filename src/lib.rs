//! possel - IRC client session engine.
//!
//! Feed raw server lines into a [`SessionEngine`]; it tracks users and
//! channels, answers PINGs, and publishes [`Event`]s to subscribers on its
//! [`EventBus`]. Outbound lines leave through an unbounded queue so the
//! engine never blocks on I/O.
//!
//! ```
//! use possel::{Event, EventKind, IdentityConfig, SessionConfig, SessionEngine};
//! use tokio::sync::mpsc;
//!
//! let (tx, mut rx) = mpsc::unbounded_channel();
//! let mut engine = SessionEngine::new(IdentityConfig::new("possel"), SessionConfig::default(), tx);
//!
//! engine.events().subscribe(EventKind::NewLine, |event| {
//!     if let Event::NewLine { user, content, .. } = event {
//!         println!("<{}> {}", user.nick, content);
//!     }
//!     Ok(())
//! });
//!
//! engine.handle_line("PING :irc.example.net").unwrap();
//! assert_eq!(rx.try_recv().unwrap().to_string(), "PONG :irc.example.net");
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod session;
pub mod state;
pub mod telemetry;

pub use config::{Config, ConfigError, IdentityConfig, SessionConfig};
pub use error::{ChannelError, RegistryError, SessionClosed, SessionError, SessionResult};
pub use events::{Event, EventBus, EventKind, LineKind, SubscriptionId};
pub use session::{SessionCommand, SessionEngine, SessionHandle, SessionState};
pub use state::{Channel, ChannelRegistry, User, UserId, UserRegistry};
