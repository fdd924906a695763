use crate::error::MessageParseError;
use crate::prefix;

/// Reject a token that would break line framing (`\r`, `\n` or NUL).
pub fn validate_param(param: &str) -> Result<(), MessageParseError> {
    if param.bytes().any(|b| b == b'\r' || b == b'\n' || b == 0) {
        return Err(MessageParseError::InvalidParameter(param.to_owned()));
    }
    Ok(())
}

/// An owned IRC line split into its three parts.
///
/// `command` is kept exactly as it appeared on the wire (a word such as
/// `PRIVMSG` or a three-digit numeric); resolving numerics to symbolic names
/// is the job of [`crate::response::resolve_command`].
///
/// # Example
///
/// ```
/// use possel_proto::Message;
///
/// let msg: Message = ":nick!user@host PRIVMSG #channel :Hello there".parse().unwrap();
/// assert_eq!(msg.prefix.as_deref(), Some("nick!user@host"));
/// assert_eq!(msg.command, "PRIVMSG");
/// assert_eq!(msg.params, vec!["#channel", "Hello there"]);
///
/// let out = Message::privmsg("#channel", "Hello!");
/// assert_eq!(out.to_string(), "PRIVMSG #channel :Hello!");
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    /// Origin of the line without the leading `:`, e.g. `nick!user@host`.
    pub prefix: Option<String>,
    /// The command word or numeric.
    pub command: String,
    /// Positional parameters, the trailing parameter last.
    pub params: Vec<String>,
    /// Whether the last parameter is written in `:`-prefixed trailing form.
    pub trailing: bool,
}

impl Message {
    /// Create a message with only space-separated parameters.
    ///
    /// The last parameter still gets the `:` form on output if it would
    /// otherwise be unparseable (empty, contains a space, starts with `:`).
    pub fn new<C, I, P>(command: C, params: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Message {
            prefix: None,
            command: command.into(),
            params: params.into_iter().map(Into::into).collect(),
            trailing: false,
        }
    }

    /// Create a message whose final parameter is always sent in trailing form.
    pub fn with_trailing<C, I, P, T>(command: C, params: I, trailing: T) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
        T: Into<String>,
    {
        let mut msg = Message::new(command, params);
        msg.params.push(trailing.into());
        msg.trailing = true;
        msg
    }

    /// Attach a prefix to this message.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Get parameter `n`, if present.
    #[inline]
    pub fn arg(&self, n: usize) -> Option<&str> {
        self.params.get(n).map(String::as_str)
    }

    /// The prefix, or an empty string when the line had none.
    #[inline]
    pub fn source(&self) -> &str {
        self.prefix.as_deref().unwrap_or("")
    }

    /// Nickname portion of the prefix (everything before `!`).
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_deref().map(prefix::nick_of)
    }

    /// Check that the message serializes to exactly one line.
    ///
    /// Constructors accept any text; call this before putting a message built
    /// from caller input on the wire.
    pub fn validate(&self) -> Result<(), MessageParseError> {
        if let Some(prefix) = &self.prefix {
            validate_param(prefix)?;
        }
        validate_param(&self.command)?;
        self.params.iter().try_for_each(|p| validate_param(p))
    }

    /// Whether the command is a three-digit numeric reply.
    pub fn is_numeric(&self) -> bool {
        !self.command.is_empty() && self.command.bytes().all(|b| b.is_ascii_digit())
    }

    /// `NICK <nick>`
    #[must_use]
    pub fn nick(nick: impl Into<String>) -> Self {
        let nick: String = nick.into();
        Message::new("NICK", [nick])
    }

    /// `USER <username> 0 * :<realname>`
    #[must_use]
    pub fn user(username: impl Into<String>, realname: impl Into<String>) -> Self {
        let params: [String; 3] = [username.into(), "0".into(), "*".into()];
        Message::with_trailing("USER", params, realname)
    }

    /// `JOIN <channel>[ <password>]`
    #[must_use]
    pub fn join(channel: impl Into<String>, password: Option<&str>) -> Self {
        let mut params: Vec<String> = vec![channel.into()];
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            params.push(password.to_string());
        }
        Message::new("JOIN", params)
    }

    /// `PART <channel>`
    #[must_use]
    pub fn part(channel: impl Into<String>) -> Self {
        let channel: String = channel.into();
        Message::new("PART", [channel])
    }

    /// `PRIVMSG <target> :<text>`
    #[must_use]
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        let target: String = target.into();
        Message::with_trailing("PRIVMSG", [target], text)
    }

    /// `PONG :<token>`
    #[must_use]
    pub fn pong(token: impl Into<String>) -> Self {
        Message::with_trailing("PONG", Vec::<String>::new(), token)
    }

    /// `QUIT[ :<message>]`
    #[must_use]
    pub fn quit(message: Option<&str>) -> Self {
        match message {
            Some(text) => Message::with_trailing("QUIT", Vec::<String>::new(), text),
            None => Message::new("QUIT", Vec::<String>::new()),
        }
    }

    /// `WHO <mask>`
    #[must_use]
    pub fn who(mask: impl Into<String>) -> Self {
        let mask: String = mask.into();
        Message::new("WHO", [mask])
    }
}
