//! Channel name recognition (RFC 2812 section 1.3).

/// Characters that may open a channel name.
pub const CHANNEL_PREFIXES: [char; 4] = ['#', '&', '+', '!'];

/// Extension trait for telling channel targets apart from nicknames.
pub trait ChannelExt {
    /// True when this string names a channel.
    ///
    /// A channel name starts with one of `#&+!`, is at most 50 characters,
    /// and contains no space, comma or control character.
    fn is_channel_name(&self) -> bool;
}

impl ChannelExt for str {
    fn is_channel_name(&self) -> bool {
        let mut chars = self.chars();
        match chars.next() {
            Some(first) if CHANNEL_PREFIXES.contains(&first) => {}
            _ => return false,
        }

        if self.chars().count() > 50 {
            return false;
        }

        chars.all(|c| c != ' ' && c != ',' && !c.is_control())
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        self.as_str().is_channel_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_channels() {
        assert!("#rust".is_channel_name());
        assert!("&local".is_channel_name());
        assert!("+modeless".is_channel_name());
        assert!("!ABCDEsafe".is_channel_name());
        assert!(String::from("#possel").is_channel_name());
    }

    #[test]
    fn test_nicknames_are_not_channels() {
        assert!(!"alice".is_channel_name());
        assert!(!"".is_channel_name());
        assert!(!"[bot]".is_channel_name());
    }

    #[test]
    fn test_invalid_characters() {
        assert!(!"#has space".is_channel_name());
        assert!(!"#a,b".is_channel_name());
        assert!(!"#bell\x07".is_channel_name());
        assert!(!format!("#{}", "x".repeat(50)).is_channel_name());
    }
}
