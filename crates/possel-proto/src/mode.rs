//! Mode change strings (`+o`, `-v`, `+ov-h`).

use std::fmt;

use crate::error::ModeParseError;

/// Whether a mode is being set or unset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// `+`
    Add,
    /// `-`
    Remove,
}

/// A single mode flag change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeChange {
    /// Set or unset.
    pub direction: Direction,
    /// The mode character.
    pub mode: char,
}

impl ModeChange {
    /// Shorthand for `+mode`.
    pub fn add(mode: char) -> Self {
        ModeChange {
            direction: Direction::Add,
            mode,
        }
    }

    /// Shorthand for `-mode`.
    pub fn remove(mode: char) -> Self {
        ModeChange {
            direction: Direction::Remove,
            mode,
        }
    }

    /// Whether this change consumes one argument from the MODE line.
    ///
    /// Flag modes from RFC 2811 take none, `l` only takes one when set,
    /// everything else (status, lists, key) takes one.
    pub fn takes_param(&self) -> bool {
        match self.mode {
            'i' | 'm' | 'n' | 'p' | 's' | 't' | 'r' => false,
            'l' => self.direction == Direction::Add,
            _ => true,
        }
    }
}

impl fmt::Display for ModeChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.direction {
            Direction::Add => '+',
            Direction::Remove => '-',
        };
        write!(f, "{}{}", sign, self.mode)
    }
}

/// Parse a mode command such as `+o` or `+ov-h` into individual changes.
///
/// The string must start with `+` or `-`; later signs switch direction for the
/// characters that follow them.
///
/// ```
/// use possel_proto::mode::{parse_mode_changes, ModeChange};
///
/// assert_eq!(parse_mode_changes("+o").unwrap(), vec![ModeChange::add('o')]);
/// assert_eq!(
///     parse_mode_changes("+o-v").unwrap(),
///     vec![ModeChange::add('o'), ModeChange::remove('v')]
/// );
/// assert!(parse_mode_changes("o").is_err());
/// ```
pub fn parse_mode_changes(command: &str) -> Result<Vec<ModeChange>, ModeParseError> {
    let mut chars = command.chars();
    let mut direction = match chars.next() {
        Some('+') => Direction::Add,
        Some('-') => Direction::Remove,
        Some(modifier) => {
            return Err(ModeParseError::UnknownModeCommand {
                command: command.to_owned(),
                modifier,
            })
        }
        None => return Err(ModeParseError::MissingMode(command.to_owned())),
    };

    let mut changes = Vec::new();
    for c in chars {
        match c {
            '+' => direction = Direction::Add,
            '-' => direction = Direction::Remove,
            mode => changes.push(ModeChange { direction, mode }),
        }
    }

    if changes.is_empty() {
        return Err(ModeParseError::MissingMode(command.to_owned()));
    }
    Ok(changes)
}

/// Member status modes and the NAMES prefixes that stand for them.
///
/// Servers advertise these through the ISUPPORT `PREFIX` token, e.g.
/// `PREFIX=(ov)@+`. Until one arrives the common `(qaohv)~&@%+` set is
/// assumed.
///
/// ```
/// use possel_proto::mode::StatusModes;
///
/// let status = StatusModes::parse("(Yov)!@+").unwrap();
/// assert!(status.is_status('Y'));
/// assert_eq!(status.mode_for_prefix('!'), Some('Y'));
/// assert_eq!(status.split_prefix("@+alice"), (vec!['o', 'v'], "alice"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusModes {
    /// `(mode, prefix)` pairs, highest rank first.
    pairs: Vec<(char, char)>,
}

impl Default for StatusModes {
    fn default() -> Self {
        Self {
            pairs: vec![('q', '~'), ('a', '&'), ('o', '@'), ('h', '%'), ('v', '+')],
        }
    }
}

impl StatusModes {
    /// Parse a `PREFIX` value such as `(ov)@+`.
    ///
    /// An empty value means the server grants no member status. Returns
    /// `None` when the modes and prefixes do not pair up.
    pub fn parse(value: &str) -> Option<Self> {
        if value.is_empty() {
            return Some(Self { pairs: Vec::new() });
        }
        let (modes, prefixes) = value.strip_prefix('(')?.split_once(')')?;
        if modes.chars().count() != prefixes.chars().count() {
            return None;
        }
        Some(Self {
            pairs: modes.chars().zip(prefixes.chars()).collect(),
        })
    }

    /// Whether `mode` grants member status (`o`, `v`, ...).
    pub fn is_status(&self, mode: char) -> bool {
        self.pairs.iter().any(|&(m, _)| m == mode)
    }

    /// The mode a NAMES prefix symbol stands for.
    pub fn mode_for_prefix(&self, prefix: char) -> Option<char> {
        self.pairs
            .iter()
            .find(|&&(_, p)| p == prefix)
            .map(|&(m, _)| m)
    }

    /// Split a NAMES entry like `@alice` into its status modes and bare nick.
    pub fn split_prefix<'a>(&self, entry: &'a str) -> (Vec<char>, &'a str) {
        let nick = entry.trim_start_matches(|c: char| self.mode_for_prefix(c).is_some());
        let modes = entry[..entry.len() - nick.len()]
            .chars()
            .filter_map(|c| self.mode_for_prefix(c))
            .collect();
        (modes, nick)
    }
}
