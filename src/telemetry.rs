//! Telemetry utilities.

/// Standardized span constructors for session observability.
pub mod spans {
    use tracing::{Span, info_span};

    /// Create a span for one client session.
    pub fn session(nick: &str) -> Span {
        info_span!("session", nick = %nick)
    }

    /// Create a span for dispatching one inbound command.
    pub fn command(name: &str, source: &str) -> Span {
        if source.is_empty() {
            info_span!("command", name = %name)
        } else {
            info_span!("command", name = %name, source = %source)
        }
    }
}
