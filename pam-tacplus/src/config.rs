//! Argv-style configuration parsing for the module's PAM stanza arguments.
//!
//! Grounded on the original `_pam_parse`: every argument is either a bare flag or a
//! `key=value` pair, and unrecognized tokens are logged and ignored rather than rejected.

use std::time::Duration;

use tacacs_plus::ServerEntry;

/// The authentication type requested via `login=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMethod {
    /// ASCII login, the only one that supports the interactive `GETDATA`/`GETUSER`/
    /// `GETPASS` conversation.
    Ascii,
    /// PAP, password sent in the `START` body.
    Pap,
    /// CHAP, an RFC1334 challenge-response sent in the `START` body.
    Chap,
}

impl Default for LoginMethod {
    fn default() -> Self {
        Self::Ascii
    }
}

/// How a password should be obtained from the host before it's used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordHint {
    /// Ask the conversation function for a fresh password.
    #[default]
    Prompt,
    /// Try whatever password PAM already cached from an earlier module in the stack
    /// first, falling back to a fresh prompt if none is cached (`try_first_pass`).
    TryFirstPass,
    /// Use whatever password PAM already cached, without falling back to a prompt
    /// (`use_first_pass`).
    UseFirstPass,
}

/// The default per-I/O timeout, used when `timeout=` is absent or unparseable.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Parsed module configuration, built fresh for every PAM call from its stanza arguments.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub servers: Vec<ServerEntry>,
    pub service: Option<String>,
    pub protocol: Option<String>,
    pub login: LoginMethod,
    pub timeout: Option<Duration>,
    pub acct_all: bool,
    pub password_hint: PasswordHint,
    pub debug: bool,
}

impl Config {
    /// Parses the `argv`-style arguments a PAM stanza passes to this module.
    ///
    /// Unrecognized tokens are ignored (and, if `debug` ends up set, logged) rather than
    /// treated as a fatal configuration error, matching the original's tolerance for
    /// stanza lines maintained by hand across many hosts.
    pub fn parse<'a>(args: impl IntoIterator<Item = &'a str>) -> Self {
        let mut config = Config::default();

        for arg in args {
            match arg.split_once('=') {
                Some(("server", value)) => {
                    if config.servers.len() >= tacacs_plus::selector::MAX_SERVERS {
                        log::warn!("ignoring server={value}: already at the maximum of {} servers", tacacs_plus::selector::MAX_SERVERS);
                        continue;
                    }
                    config.servers.push(ServerEntry::new(value, Vec::new()));
                }
                Some(("secret", value)) => match config.servers.last_mut() {
                    Some(entry) => entry.set_secret(value.as_bytes().to_vec()),
                    None => log::warn!("ignoring secret= with no preceding server="),
                },
                Some(("service", value)) => config.service = Some(value.to_owned()),
                Some(("protocol", value)) => config.protocol = Some(value.to_owned()),
                Some(("login", value)) => {
                    config.login = match value {
                        "ascii" => LoginMethod::Ascii,
                        "pap" => LoginMethod::Pap,
                        "chap" => LoginMethod::Chap,
                        other => {
                            log::warn!("unrecognized login={other}, defaulting to ascii");
                            LoginMethod::Ascii
                        }
                    };
                }
                Some(("timeout", value)) => match value.parse::<u64>() {
                    Ok(seconds) => config.timeout = Some(Duration::from_secs(seconds)),
                    Err(_) => log::warn!("ignoring unparseable timeout={value}"),
                },
                Some((key, _)) => log::warn!("unrecognized configuration option {key}"),
                None => match arg {
                    "acct_all" => config.acct_all = true,
                    "try_first_pass" => config.password_hint = PasswordHint::TryFirstPass,
                    "use_first_pass" => config.password_hint = PasswordHint::UseFirstPass,
                    "debug" => config.debug = true,
                    other => log::warn!("unrecognized configuration flag {other}"),
                },
            }
        }

        config
    }

    /// The configured timeout, or [`DEFAULT_TIMEOUT`] if none was given.
    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Raises the process-wide log level to `Debug` when the `debug` flag is set.
    ///
    /// Mirrors the original's `ctrl & PAM_TAC_DEBUG` gate around its `_pam_log(LOG_DEBUG,
    /// ...)` call sites: without `debug`, this module's `log::debug!` calls are filtered
    /// out by whatever max level the host application already has in place. Only ever
    /// raises the level, never lowers a more verbose one the host configured itself.
    pub fn apply_log_level(&self) {
        if self.debug && log::max_level() < log::LevelFilter::Debug {
            log::set_max_level(log::LevelFilter::Debug);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_server_and_secret_pairs() {
        let config = Config::parse(["server=10.0.0.1:49", "secret=cisco", "server=10.0.0.2", "secret=other"]);

        assert_eq!(config.servers.len(), 2);
        assert_eq!(config.servers[0].address(), "10.0.0.1:49");
        assert_eq!(config.servers[0].secret(), b"cisco");
        assert_eq!(config.servers[1].secret(), b"other");
    }

    #[test]
    fn secret_with_no_preceding_server_is_ignored() {
        let config = Config::parse(["secret=orphaned"]);
        assert!(config.servers.is_empty());
    }

    #[test]
    fn unparseable_timeout_falls_back_to_default() {
        let config = Config::parse(["timeout=not-a-number"]);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn flags_set_their_corresponding_fields() {
        let config = Config::parse(["acct_all", "debug", "try_first_pass"]);
        assert!(config.acct_all);
        assert!(config.debug);
        assert_eq!(config.password_hint, PasswordHint::TryFirstPass);
    }

    #[test]
    fn login_defaults_to_ascii_on_unrecognized_value() {
        let config = Config::parse(["login=sendauth"]);
        assert_eq!(config.login, LoginMethod::Ascii);
    }
}
