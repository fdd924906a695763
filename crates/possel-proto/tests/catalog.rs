//! Numeric catalog and line-level integration checks.

use possel_proto::response::{resolve_command, ParseResponseError};
use possel_proto::{parse_line, Response};

#[test]
fn welcome_line_resolves_to_symbolic_name() {
    let msg = parse_line(":irc.example.net 001 alice :Welcome to IRC").unwrap();
    assert_eq!(resolve_command(&msg.command), Ok("RPL_WELCOME"));
    assert_eq!(msg.params, vec!["alice", "Welcome to IRC"]);
}

#[test]
fn names_reply_layout() {
    let msg = parse_line(":srv 353 alice = #possel :@alice +bob carol").unwrap();
    assert_eq!(resolve_command(&msg.command), Ok("RPL_NAMREPLY"));
    assert_eq!(msg.params, vec!["alice", "=", "#possel", "@alice +bob carol"]);
}

#[test]
fn words_pass_through_unchanged() {
    assert_eq!(resolve_command("PRIVMSG"), Ok("PRIVMSG"));
    assert_eq!(resolve_command("JOIN"), Ok("JOIN"));
}

#[test]
fn unknown_numeric_is_reported() {
    assert_eq!(
        resolve_command("999"),
        Err(ParseResponseError::UnknownNumeric(999))
    );
}

#[test]
fn motd_numerics_present() {
    assert_eq!(Response::from_code(375), Some(Response::RPL_MOTDSTART));
    assert_eq!(Response::from_code(372), Some(Response::RPL_MOTD));
    assert_eq!(Response::from_code(376), Some(Response::RPL_ENDOFMOTD));
}
