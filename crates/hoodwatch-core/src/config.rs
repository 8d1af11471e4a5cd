use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "https://api.robinhood.com";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Connection and credential settings for the brokerage session.
///
/// Resolution order is explicit argument, then environment, then default.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub session_path: Option<PathBuf>,
    pub allow_mfa: bool,
    pub mfa_code: Option<String>,
    pub api_base_url: String,
    pub timeout_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            session_path: None,
            allow_mfa: false,
            mfa_code: None,
            api_base_url: String::from(DEFAULT_API_BASE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl SessionConfig {
    /// Loads `RH_*` and `HOODWATCH_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        Self {
            username: non_empty("RH_USERNAME"),
            password: non_empty("RH_PASSWORD"),
            session_path: non_empty("RH_SESSION_PATH").map(PathBuf::from),
            allow_mfa: lookup("RH_ALLOW_MFA").is_some_and(|value| value == "1"),
            mfa_code: non_empty("RH_MFA_CODE"),
            api_base_url: non_empty("HOODWATCH_API_BASE_URL")
                .unwrap_or_else(|| String::from(DEFAULT_API_BASE_URL)),
            timeout_ms: lookup("HOODWATCH_TIMEOUT_MS")
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_MS),
        }
    }

    pub fn with_username(mut self, username: Option<String>) -> Self {
        if username.is_some() {
            self.username = username;
        }
        self
    }

    pub fn with_password(mut self, password: Option<String>) -> Self {
        if password.is_some() {
            self.password = password;
        }
        self
    }

    pub fn with_session_path(mut self, session_path: Option<PathBuf>) -> Self {
        if session_path.is_some() {
            self.session_path = session_path;
        }
        self
    }

    /// `Some(true)` from a flag overrides the environment; `None` keeps it.
    pub fn with_allow_mfa(mut self, allow_mfa: Option<bool>) -> Self {
        if let Some(allow_mfa) = allow_mfa {
            self.allow_mfa = allow_mfa;
        }
        self
    }

    pub fn with_mfa_code(mut self, mfa_code: Option<String>) -> Self {
        if mfa_code.is_some() {
            self.mfa_code = mfa_code;
        }
        self
    }

    pub fn with_api_base_url(mut self, api_base_url: Option<String>) -> Self {
        if let Some(url) = api_base_url {
            self.api_base_url = url;
        }
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        if let Some(timeout_ms) = timeout_ms {
            self.timeout_ms = timeout_ms;
        }
        self
    }

    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("session_path", &self.session_path)
            .field("allow_mfa", &self.allow_mfa)
            .field("mfa_code", &self.mfa_code.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reads_credentials_and_mfa_flag_from_environment() {
        let config = SessionConfig::from_lookup(lookup_from(&[
            ("RH_USERNAME", "trader@example.com"),
            ("RH_PASSWORD", "hunter2"),
            ("RH_SESSION_PATH", "/tmp/rh"),
            ("RH_ALLOW_MFA", "1"),
        ]));

        assert_eq!(config.username.as_deref(), Some("trader@example.com"));
        assert!(config.has_credentials());
        assert_eq!(config.session_path, Some(PathBuf::from("/tmp/rh")));
        assert!(config.allow_mfa);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn mfa_flag_requires_literal_one() {
        let config = SessionConfig::from_lookup(lookup_from(&[("RH_ALLOW_MFA", "true")]));
        assert!(!config.allow_mfa);
    }

    #[test]
    fn explicit_arguments_override_environment() {
        let config = SessionConfig::from_lookup(lookup_from(&[
            ("RH_USERNAME", "env-user"),
            ("HOODWATCH_TIMEOUT_MS", "2500"),
        ]))
        .with_username(Some(String::from("arg-user")))
        .with_password(None)
        .with_allow_mfa(Some(true));

        assert_eq!(config.username.as_deref(), Some("arg-user"));
        assert_eq!(config.password, None);
        assert!(config.allow_mfa);
        assert_eq!(config.timeout_ms, 2500);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = SessionConfig::default()
            .with_password(Some(String::from("hunter2")))
            .with_mfa_code(Some(String::from("123456")));
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("123456"));
    }
}
