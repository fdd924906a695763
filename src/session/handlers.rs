//! Inbound command handlers, keyed by symbolic command name.

use std::collections::HashMap;

use possel_proto::ctcp::{Ctcp, action_body};
use possel_proto::mode::{ModeChange, StatusModes, parse_mode_changes};
use possel_proto::{ChannelExt, Message, Prefix};
use tracing::{debug, info};

use crate::error::{ChannelError, SessionError, SessionResult};
use crate::events::{Event, LineKind};

use super::{HandlerFn, SessionEngine, SessionState};

/// Get argument `$idx` or bail out with `NeedMoreParams`.
macro_rules! require_arg {
    ($msg:expr, $idx:expr, $cmd:expr) => {
        match $msg.arg($idx) {
            Some(s) => s,
            None => {
                return Err(SessionError::NeedMoreParams {
                    command: $cmd,
                    expected: $idx + 1,
                    got: $msg.params.len(),
                })
            }
        }
    };
}

/// Build the dispatch table.
pub(super) fn table() -> HashMap<&'static str, HandlerFn> {
    let mut handlers: HashMap<&'static str, HandlerFn> = HashMap::new();

    // Connection
    handlers.insert("PING", on_ping);
    handlers.insert("RPL_WELCOME", on_welcome);

    // Channel membership
    handlers.insert("JOIN", on_join);
    handlers.insert("PART", on_part);
    handlers.insert("QUIT", on_quit);
    handlers.insert("NICK", on_nick);
    handlers.insert("MODE", on_mode);
    handlers.insert("RPL_NAMREPLY", on_namreply);
    handlers.insert("RPL_WHOREPLY", on_whoreply);

    // Messaging
    handlers.insert("PRIVMSG", on_privmsg);
    handlers.insert("NOTICE", on_notice);

    // MOTD
    handlers.insert("RPL_MOTDSTART", on_motdstart);
    handlers.insert("RPL_MOTD", on_motd);
    handlers.insert("RPL_ENDOFMOTD", on_endofmotd);

    // Informational replies, accepted without effect
    handlers.insert("RPL_ISUPPORT", on_isupport);
    for name in [
        "RPL_YOURHOST",
        "RPL_CREATED",
        "RPL_MYINFO",
        "RPL_LUSERCLIENT",
        "RPL_LUSEROP",
        "RPL_LUSERUNKNOWN",
        "RPL_LUSERCHANNELS",
        "RPL_LUSERME",
        "RPL_LOCALUSERS",
        "RPL_GLOBALUSERS",
        "RPL_ENDOFNAMES",
        "RPL_ENDOFWHO",
        "RPL_TOPIC",
        "RPL_NOTOPIC",
        "RPL_TOPICWHOTIME",
        "RPL_CREATIONTIME",
    ] {
        handlers.insert(name, on_informational);
    }

    handlers
}

// ============================================================================
// Connection
// ============================================================================

fn on_ping(engine: &mut SessionEngine, msg: &Message) -> SessionResult {
    let token = require_arg!(msg, 0, "PING");
    engine.send(Message::pong(token))
}

/// `RPL_WELCOME <nick> :<text>`: registration is complete.
fn on_welcome(engine: &mut SessionEngine, msg: &Message) -> SessionResult {
    engine.state = SessionState::Registered;

    // The server may have truncated or altered the requested nick.
    if let Some(granted) = msg.arg(0) {
        let current = engine.nick().to_owned();
        if granted != current {
            let own = engine.users.own_id();
            let displaced = engine.users.rename(&current, granted)?;
            engine.merge_displaced(displaced, own);
            engine.identity.nick = granted.to_owned();
        }
    }

    let server = msg.source().to_owned();
    info!(server = %server, nick = %engine.nick(), "Registered");
    engine.server = Some(server.clone());
    engine.publish(Event::NewServer { server });

    for channel in engine.config.autojoin.clone() {
        engine.join(&channel, None)?;
    }
    Ok(())
}

/// `RPL_ISUPPORT <me> <token>... :are supported by this server`
///
/// Only `PREFIX` is acted on; it decides which modes are member status.
fn on_isupport(engine: &mut SessionEngine, msg: &Message) -> SessionResult {
    debug!(tokens = ?msg.params.get(1..), "Server supports");

    for token in msg.params.iter().skip(1) {
        if token == "-PREFIX" {
            engine.status = StatusModes::default();
        } else if let Some(value) = token.strip_prefix("PREFIX=") {
            match StatusModes::parse(value) {
                Some(status) => engine.status = status,
                None => debug!(value = %value, "Ignoring malformed PREFIX"),
            }
        }
    }
    Ok(())
}

fn on_informational(_engine: &mut SessionEngine, _msg: &Message) -> SessionResult {
    Ok(())
}

// ============================================================================
// Channel membership
// ============================================================================

/// `:who JOIN <channel>`
fn on_join(engine: &mut SessionEngine, msg: &Message) -> SessionResult {
    let channel = require_arg!(msg, 0, "JOIN");
    let id = engine.resolve_full(msg.source())?;

    engine.ensure_channel(channel);
    if engine.users.is_own(id) {
        info!(channel = %channel, "Joined");
        return Ok(());
    }

    let Some(user) = engine.snapshot(id) else {
        return Ok(());
    };
    let (chan, _) = engine.channels.get_or_create(channel);
    chan.user_join(&user)?;
    chan.record(id, LineKind::Join, "");
    let channel = chan.name.clone();

    engine.publish(Event::NewMembership { user, channel });
    Ok(())
}

/// `:who PART <channel> [:<reason>]`
fn on_part(engine: &mut SessionEngine, msg: &Message) -> SessionResult {
    let channel = require_arg!(msg, 0, "PART");
    let id = engine.resolve_full(msg.source())?;
    if engine.users.is_own(id) {
        info!(channel = %channel, "Parted");
        return Ok(());
    }

    let Some(user) = engine.snapshot(id) else {
        return Ok(());
    };
    let Some(chan) = engine.channels.get_mut(channel) else {
        return Err(ChannelError::UserNotFound {
            nick: user.nick,
            channel: channel.to_owned(),
        }
        .into());
    };
    chan.user_part(&user)?;
    chan.record(id, LineKind::Part, msg.arg(1).unwrap_or(""));
    let channel = chan.name.clone();

    engine.publish(Event::DeletedMembership { user, channel });
    Ok(())
}

/// `:who QUIT [:<reason>]`: leave every channel the user was in.
fn on_quit(engine: &mut SessionEngine, msg: &Message) -> SessionResult {
    let id = engine.resolve_full(msg.source())?;
    if engine.users.is_own(id) {
        return Ok(());
    }
    let Some(user) = engine.snapshot(id) else {
        return Ok(());
    };
    let reason = msg.arg(0).unwrap_or("");

    let mut left = Vec::new();
    for chan in engine.channels.iter_mut() {
        match chan.user_part(&user) {
            Ok(()) => {
                chan.record(id, LineKind::Quit, reason);
                left.push(chan.name.clone());
            }
            // Not every channel has every user.
            Err(ChannelError::UserNotFound { .. }) => {}
            Err(e) => return Err(e.into()),
        }
    }

    for channel in left {
        engine.publish(Event::DeletedMembership {
            user: user.clone(),
            channel,
        });
    }
    Ok(())
}

/// `:who NICK <new>`
fn on_nick(engine: &mut SessionEngine, msg: &Message) -> SessionResult {
    let new_nick = require_arg!(msg, 0, "NICK");
    let id = engine.resolve_full(msg.source())?;
    let Some(old_nick) = engine.users.get(id).map(|u| u.nick.clone()) else {
        return Ok(());
    };
    debug!(old = %old_nick, new = %new_nick, "Nick change");

    let displaced = engine.users.rename(&old_nick, new_nick)?;
    engine.merge_displaced(displaced, id);
    if engine.users.is_own(id) {
        engine.identity.nick = new_nick.to_owned();
    }

    let Some(user) = engine.snapshot(id) else {
        return Ok(());
    };
    let mut affected = Vec::new();
    for chan in engine.channels.iter_mut() {
        if chan.is_member(id) {
            chan.record(id, LineKind::Nick, new_nick);
            affected.push(chan.name.clone());
        }
    }
    for channel in affected {
        engine.publish(Event::NickChange {
            user: user.clone(),
            old_nick: old_nick.clone(),
            channel,
        });
    }
    Ok(())
}

/// `MODE <channel> <changes> [<nick>...]`
///
/// Only status modes (`o`, `v`, or whatever `PREFIX` advertised) are
/// tracked; other channel modes consume their argument and are otherwise
/// ignored.
fn on_mode(engine: &mut SessionEngine, msg: &Message) -> SessionResult {
    let target = require_arg!(msg, 0, "MODE");
    if !target.is_channel_name() {
        debug!(target = %target, modes = ?msg.params.get(1..), "User mode change");
        return Ok(());
    }
    let Some(command) = msg.arg(1) else {
        return Ok(());
    };

    let changes = parse_mode_changes(command)?;
    let key = engine.channels.key(target);
    let mut args = msg.params.iter().skip(2);

    for change in changes {
        let status = engine.status.is_status(change.mode);
        if !status && !change.takes_param() {
            continue;
        }
        let Some(nick) = args.next() else {
            debug!(change = %change, "Mode change without argument");
            break;
        };
        if !status {
            continue;
        }

        let id = engine.resolve_nick(nick);
        if let Some(user) = engine.users.get_mut(id) {
            if !user.apply_mode(&key, change) {
                debug!(nick = %nick, change = %change, "Mode change had no effect");
            }
        }
    }
    Ok(())
}

/// `RPL_NAMREPLY <me> <secrecy> <channel> :<names>`
fn on_namreply(engine: &mut SessionEngine, msg: &Message) -> SessionResult {
    let got = msg.params.len();
    if got < 3 {
        return Err(SessionError::NeedMoreParams {
            command: "RPL_NAMREPLY",
            expected: 3,
            got,
        });
    }
    let channel = &msg.params[got - 2];
    let names = &msg.params[got - 1];

    engine.ensure_channel(channel);
    let key = engine.channels.key(channel);

    for entry in names.split_whitespace() {
        let (modes, nick) = engine.status.split_prefix(entry);
        if nick.is_empty() {
            continue;
        }
        let id = engine.resolve_nick(nick);
        if let Some(user) = engine.users.get_mut(id) {
            for mode in modes {
                user.apply_mode(&key, ModeChange::add(mode));
            }
        }

        let (chan, _) = engine.channels.get_or_create(channel);
        if chan.insert_member(id) {
            let channel = chan.name.clone();
            if let Some(user) = engine.snapshot(id) {
                engine.publish(Event::NewMembership { user, channel });
            }
        }
    }
    Ok(())
}

/// `RPL_WHOREPLY <me> <channel> <user> <host> <server> <nick> <flags> :<hops> <realname>`
fn on_whoreply(engine: &mut SessionEngine, msg: &Message) -> SessionResult {
    let got = msg.params.len();
    if got < 8 {
        return Err(SessionError::NeedMoreParams {
            command: "RPL_WHOREPLY",
            expected: 8,
            got,
        });
    }
    let (username, host, nick) = (&msg.params[2], &msg.params[3], &msg.params[5]);
    let realname = msg.params[got - 1]
        .split_once(' ')
        .map_or("", |(_hops, name)| name);

    let id = engine.resolve_full(&format!("{nick}!{username}@{host}"))?;
    if let Some(user) = engine.users.get_mut(id) {
        user.realname = realname.to_owned();
    }
    Ok(())
}

// ============================================================================
// Messaging
// ============================================================================

/// `:who PRIVMSG <target> :<text>`
fn on_privmsg(engine: &mut SessionEngine, msg: &Message) -> SessionResult {
    let target = require_arg!(msg, 0, "PRIVMSG");
    let text = require_arg!(msg, 1, "PRIVMSG");

    if !target.is_channel_name() {
        debug!(from = %msg.source(), to = %target, "Private message");
        return Ok(());
    }

    let id = engine.resolve_full(msg.source())?;
    let (kind, content) = classify(text);
    engine.channel_line(id, target, kind, content);

    if kind == LineKind::Message {
        engine.introspect(target, content)?;
    }
    Ok(())
}

/// ACTION is matched strictly; any other CTCP is kept verbatim as `Other`.
fn classify(text: &str) -> (LineKind, &str) {
    if let Some(body) = action_body(text) {
        (LineKind::Action, body)
    } else if Ctcp::parse(text).is_some() {
        (LineKind::Other, text)
    } else {
        (LineKind::Message, text)
    }
}

/// `:who NOTICE <target> :<text>`
fn on_notice(engine: &mut SessionEngine, msg: &Message) -> SessionResult {
    let target = require_arg!(msg, 0, "NOTICE");
    let text = require_arg!(msg, 1, "NOTICE");
    info!(from = %msg.source(), to = %target, "NOTICE: {}", text);

    if !target.is_channel_name() {
        return Ok(());
    }
    // Servers may notice a channel; only user notices become lines.
    if Prefix::new_from_str(msg.source()).is_server() {
        return Ok(());
    }
    let id = engine.resolve_full(msg.source())?;
    engine.channel_line(id, target, LineKind::Notice, text);
    Ok(())
}

// ============================================================================
// MOTD
// ============================================================================

fn on_motdstart(engine: &mut SessionEngine, _msg: &Message) -> SessionResult {
    engine.motd.clear();
    Ok(())
}

fn on_motd(engine: &mut SessionEngine, msg: &Message) -> SessionResult {
    let line = msg.params.last().map_or("", String::as_str);
    engine.motd.push_str(line);
    engine.motd.push('\n');
    Ok(())
}

fn on_endofmotd(engine: &mut SessionEngine, _msg: &Message) -> SessionResult {
    info!("MOTD:\n{}", engine.motd);
    engine.publish(Event::Motd {
        text: engine.motd.clone(),
    });
    // Backfill real names and hosts for everyone we can see.
    engine.send(Message::who("0"))
}

// ============================================================================
// Channel introspection
// ============================================================================

impl SessionEngine {
    /// `!d listmessages` and `!d listusers` in a channel.
    fn introspect(&mut self, channel: &str, text: &str) -> SessionResult {
        let lines: Vec<String> = if text.starts_with("!d listmessages") {
            let Some(chan) = self.channels.get(channel) else {
                return Ok(());
            };
            chan.messages()
                .iter()
                .map(|entry| {
                    let speaker = self
                        .users
                        .get(entry.speaker)
                        .map_or_else(|| entry.speaker.to_string(), |u| u.nick.clone());
                    format!("{} <{}> {}", entry.kind, speaker, entry.content)
                })
                .collect()
        } else if text.starts_with("!d listusers") {
            self.users.sorted().into_iter().map(ToString::to_string).collect()
        } else {
            return Ok(());
        };

        for line in &lines {
            debug!(channel = %channel, "{}", line);
        }
        if self.config.debug_out_loud && !lines.is_empty() {
            self.send_message(channel, &lines.join("\n"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_lines() {
        assert_eq!(classify("hello"), (LineKind::Message, "hello"));
        assert_eq!(classify("\x01ACTION waves\x01"), (LineKind::Action, "waves"));
        assert_eq!(
            classify("\x01VERSION\x01"),
            (LineKind::Other, "\x01VERSION\x01")
        );
        assert_eq!(
            classify("\x01ACTION waves"),
            (LineKind::Other, "\x01ACTION waves")
        );
    }

    #[test]
    fn table_covers_core_commands() {
        let table = table();
        for name in [
            "PING",
            "PRIVMSG",
            "JOIN",
            "PART",
            "QUIT",
            "NICK",
            "MODE",
            "RPL_NAMREPLY",
            "RPL_MOTDSTART",
            "RPL_MOTD",
            "RPL_ENDOFMOTD",
            "RPL_WELCOME",
        ] {
            assert!(table.contains_key(name), "{name} missing");
        }
    }
}
