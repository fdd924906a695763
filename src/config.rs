//! Configuration loading.

use possel_proto::Casemapping;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Who we are on the network.
    pub identity: IdentityConfig,
    /// Session behavior.
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// The session's own identity.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    pub nick: String,
    /// Defaults to the nick.
    pub username: Option<String>,
    /// Defaults to the nick.
    pub realname: Option<String>,
}

impl IdentityConfig {
    /// Identity with only a nick set.
    pub fn new(nick: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            username: None,
            realname: None,
        }
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.nick)
    }

    pub fn realname(&self) -> &str {
        self.realname.as_deref().unwrap_or(&self.nick)
    }
}

/// Session behavior knobs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// Channels joined once registration completes.
    #[serde(default)]
    pub autojoin: Vec<String>,
    /// Echo `!d` introspection output into the channel.
    #[serde(default)]
    pub debug_out_loud: bool,
    /// Folding rule for nick and channel keys.
    #[serde(default)]
    pub casemapping: Casemapping,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn minimal_config_uses_defaults() {
        let config: Config = toml::from_str("[identity]\nnick = \"possel\"\n").unwrap();
        assert_eq!(config.identity.username(), "possel");
        assert_eq!(config.identity.realname(), "possel");
        assert!(config.session.autojoin.is_empty());
        assert!(!config.session.debug_out_loud);
        assert_eq!(config.session.casemapping, Casemapping::Rfc1459);
    }

    #[test]
    fn load_full_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r##"
[identity]
nick = "possel"
username = "pos"
realname = "Possel Client"

[session]
autojoin = ["#possel", "#rust"]
debug_out_loud = true
casemapping = "ascii"
"##
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.identity.username(), "pos");
        assert_eq!(config.identity.realname(), "Possel Client");
        assert_eq!(config.session.autojoin, vec!["#possel", "#rust"]);
        assert!(config.session.debug_out_loud);
        assert_eq!(config.session.casemapping, Casemapping::Ascii);
    }

    #[test]
    fn missing_identity_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[session]\nautojoin = []\n").unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            Config::load("/nonexistent/possel.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
