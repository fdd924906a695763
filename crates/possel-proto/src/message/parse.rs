//! Line splitting.
//!
//! A line is `[":" prefix SPACE] command [params] [" :" trailing]`. The
//! trailing parameter starts at the *first* occurrence of `" :"` after the
//! prefix and runs to the end of the line, spaces included; everything before
//! it is split on whitespace.

use std::str::FromStr;

use nom::{
    bytes::complete::{take_till1, take_while1},
    character::complete::{char, space0},
    combinator::{all_consuming, opt},
    sequence::{preceded, terminated},
    IResult,
};

use crate::error::MessageParseError;

use super::types::Message;

/// Parse message prefix (the part after `:` and before the first space).
fn parse_prefix(input: &str) -> IResult<&str, &str> {
    terminated(preceded(char(':'), take_till1(|c| c == ' ')), space0)(input)
}

/// Parse the command name (letters or digits only).
fn parse_command(input: &str) -> IResult<&str, &str> {
    all_consuming(take_while1(|c: char| c.is_ascii_alphanumeric()))(input)
}

/// A parsed line borrowing from its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedLine<'a> {
    pub prefix: Option<&'a str>,
    pub command: &'a str,
    pub params: Vec<&'a str>,
    pub trailing: bool,
}

impl<'a> ParsedLine<'a> {
    pub(crate) fn parse(raw: &'a str) -> Result<Self, MessageParseError> {
        let line = raw.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(MessageParseError::EmptyLine);
        }

        let (body, prefix) = match opt(parse_prefix)(line) {
            Ok(parsed) => parsed,
            Err(_) => return Err(MessageParseError::MissingCommand(line.to_owned())),
        };

        let (head, trailing) = match body.split_once(" :") {
            Some((head, trailing)) => (head, Some(trailing)),
            None => (body, None),
        };

        let mut tokens = head.split_whitespace();
        let command = match tokens.next() {
            Some(command) => command,
            None => return Err(MessageParseError::MissingCommand(line.to_owned())),
        };
        if parse_command(command).is_err() {
            return Err(MessageParseError::InvalidCommand(command.to_owned()));
        }

        let mut params: Vec<&str> = tokens.collect();
        if let Some(trailing) = trailing {
            params.push(trailing);
        }

        Ok(ParsedLine {
            prefix,
            command,
            params,
            trailing: trailing.is_some(),
        })
    }
}

impl From<ParsedLine<'_>> for Message {
    fn from(parsed: ParsedLine<'_>) -> Self {
        Message {
            prefix: parsed.prefix.map(str::to_owned),
            command: parsed.command.to_owned(),
            params: parsed.params.into_iter().map(str::to_owned).collect(),
            trailing: parsed.trailing,
        }
    }
}

/// Split a raw line into `(prefix, command, params)`.
///
/// A trailing `\r\n` is tolerated. Fails with [`MessageParseError::EmptyLine`]
/// on empty input.
pub fn parse_line(raw: &str) -> Result<Message, MessageParseError> {
    ParsedLine::parse(raw).map(Message::from)
}

impl Message {
    /// Parse a raw line; see [`parse_line`].
    pub fn parse(raw: &str) -> Result<Message, MessageParseError> {
        parse_line(raw)
    }
}

impl FromStr for Message {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_line(s)
    }
}
