//! Session state: users, channels and the registries that own them.

mod channel;
mod registry;
mod user;

pub use channel::{Channel, LogEntry};
pub use registry::{ChannelRegistry, Resolved, UserRegistry};
pub use user::{User, UserId};
