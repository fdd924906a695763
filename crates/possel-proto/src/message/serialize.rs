use std::fmt::{self, Display, Formatter};

use super::types::Message;

/// Whether a final parameter can only be sent in `:` form.
fn needs_trailing(param: &str) -> bool {
    param.is_empty() || param.contains(' ') || param.starts_with(':')
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, ":{} ", prefix)?;
        }

        f.write_str(&self.command)?;

        if let Some((last, middle)) = self.params.split_last() {
            for param in middle {
                write!(f, " {}", param)?;
            }
            if self.trailing || needs_trailing(last) {
                write!(f, " :{}", last)?;
            } else {
                write!(f, " {}", last)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_with_prefix() {
        let msg = Message::privmsg("#x", "hello world").with_prefix("bob!b@h");
        assert_eq!(msg.to_string(), ":bob!b@h PRIVMSG #x :hello world");
    }

    #[test]
    fn test_last_param_with_space_gets_colon() {
        let msg = Message::new("TOPIC", ["#x", "new topic"]);
        assert_eq!(msg.to_string(), "TOPIC #x :new topic");
    }

    #[test]
    fn test_reparse_keeps_parts() {
        let raw = ":srv 372 me :- Welcome to the network";
        let msg: Message = raw.parse().unwrap();
        assert_eq!(msg.to_string(), raw);
    }
}
