//! Case folding for nick and channel keys.
//!
//! Servers advertise their folding rule with `CASEMAPPING` in `RPL_ISUPPORT`.
//! `rfc1459` additionally treats `[]\~` as the uppercase forms of `{}|^`.

use std::str::FromStr;

/// A case folding rule for registry keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Casemapping {
    /// Plain ASCII letters only.
    Ascii,
    /// ASCII plus `[`→`{`, `]`→`}`, `\`→`|`, `~`→`^`.
    #[default]
    Rfc1459,
}

impl Casemapping {
    /// Fold one character to its lowercase key form.
    #[inline]
    pub const fn fold_char(self, c: char) -> char {
        match (self, c) {
            (_, 'A'..='Z') => (c as u8 + 32) as char,
            (Casemapping::Rfc1459, '[') => '{',
            (Casemapping::Rfc1459, ']') => '}',
            (Casemapping::Rfc1459, '\\') => '|',
            (Casemapping::Rfc1459, '~') => '^',
            _ => c,
        }
    }

    /// Fold a whole string to its key form.
    pub fn fold(self, s: &str) -> String {
        s.chars().map(|c| self.fold_char(c)).collect()
    }

    /// Case-insensitive equality under this mapping.
    pub fn equals(self, a: &str, b: &str) -> bool {
        a.len() == b.len()
            && a.chars()
                .zip(b.chars())
                .all(|(x, y)| self.fold_char(x) == self.fold_char(y))
    }
}

impl FromStr for Casemapping {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" => Ok(Casemapping::Ascii),
            "rfc1459" => Ok(Casemapping::Rfc1459),
            other => Err(format!("unsupported casemapping {other:?}")),
        }
    }
}
