//! Outbound operations and the cross-task command handle.

use possel_proto::{ChannelExt, Ctcp, Message};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{SessionClosed, SessionResult};
use crate::events::LineKind;

use super::{SessionEngine, SessionState};

impl SessionEngine {
    /// Queue one message, refusing any that would not stay a single line.
    pub(super) fn send(&self, msg: Message) -> SessionResult {
        msg.validate()?;
        debug!(line = %msg, "send");
        self.outbound.send(msg)?;
        Ok(())
    }

    /// Send `NICK` then `USER` and enter [`SessionState::Registering`].
    pub fn begin_registration(&mut self) -> SessionResult {
        self.state = SessionState::Registering;
        self.send(Message::nick(self.identity.nick.clone()))?;
        self.send(Message::user(
            self.identity.username(),
            self.identity.realname(),
        ))
    }

    /// `JOIN <channel>[ <password>]`
    pub fn join(&mut self, channel: &str, password: Option<&str>) -> SessionResult {
        self.send(Message::join(channel, password))
    }

    /// `PART <channel>`
    pub fn part(&mut self, channel: &str) -> SessionResult {
        self.send(Message::part(channel))
    }

    /// Send text to a channel or nick, one PRIVMSG per line.
    ///
    /// Both `\r` and `\n` break lines and blank lines are skipped. Lines sent
    /// to a channel are also recorded and published as our own `message`
    /// lines.
    pub fn send_message(&mut self, target: &str, text: &str) -> SessionResult {
        for line in text.split(['\r', '\n']) {
            if line.is_empty() {
                continue;
            }
            self.send(Message::privmsg(target, line))?;
            self.echo(target, LineKind::Message, line);
        }
        Ok(())
    }

    /// Send a CTCP ACTION (`/me`).
    pub fn send_action(&mut self, target: &str, text: &str) -> SessionResult {
        let body = Ctcp::action(text).to_string();
        self.send(Message::privmsg(target, body))?;
        self.echo(target, LineKind::Action, text);
        Ok(())
    }

    /// Ask the server for a new nick; the registry follows the server's echo.
    pub fn change_nick(&mut self, nick: &str) -> SessionResult {
        self.send(Message::nick(nick))
    }

    /// `QUIT[ :<message>]`
    pub fn quit(&mut self, message: Option<&str>) -> SessionResult {
        self.send(Message::quit(message))
    }

    /// Apply a command queued through a [`SessionHandle`].
    pub fn apply(&mut self, command: SessionCommand) -> SessionResult {
        match command {
            SessionCommand::Join { channel, password } => self.join(&channel, password.as_deref()),
            SessionCommand::Part { channel } => self.part(&channel),
            SessionCommand::SendMessage { target, text } => self.send_message(&target, &text),
            SessionCommand::SendAction { target, text } => self.send_action(&target, &text),
            SessionCommand::ChangeNick { nick } => self.change_nick(&nick),
            SessionCommand::Quit { message } => self.quit(message.as_deref()),
        }
    }

    fn echo(&mut self, target: &str, kind: LineKind, content: &str) {
        if target.is_channel_name() {
            let own = self.users.own_id();
            self.channel_line(own, target, kind, content);
        }
    }
}

/// Outbound requests from collaborators running on other tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Join {
        channel: String,
        password: Option<String>,
    },
    Part {
        channel: String,
    },
    SendMessage {
        target: String,
        text: String,
    },
    SendAction {
        target: String,
        text: String,
    },
    ChangeNick {
        nick: String,
    },
    Quit {
        message: Option<String>,
    },
}

/// Cloneable, thread-safe front for a session's outbound operations.
///
/// Commands are queued and applied by the task that owns the
/// [`SessionEngine`], so registry state is only touched from that task.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Create a handle and the receiver its commands arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, command: SessionCommand) -> Result<(), SessionClosed> {
        self.tx.send(command).map_err(|_| SessionClosed)
    }

    pub fn join(&self, channel: impl Into<String>, password: Option<String>) -> Result<(), SessionClosed> {
        self.send(SessionCommand::Join {
            channel: channel.into(),
            password,
        })
    }

    pub fn part(&self, channel: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(SessionCommand::Part {
            channel: channel.into(),
        })
    }

    pub fn send_message(
        &self,
        target: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), SessionClosed> {
        self.send(SessionCommand::SendMessage {
            target: target.into(),
            text: text.into(),
        })
    }

    pub fn send_action(
        &self,
        target: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), SessionClosed> {
        self.send(SessionCommand::SendAction {
            target: target.into(),
            text: text.into(),
        })
    }

    pub fn change_nick(&self, nick: impl Into<String>) -> Result<(), SessionClosed> {
        self.send(SessionCommand::ChangeNick { nick: nick.into() })
    }

    pub fn quit(&self, message: Option<String>) -> Result<(), SessionClosed> {
        self.send(SessionCommand::Quit { message })
    }
}
