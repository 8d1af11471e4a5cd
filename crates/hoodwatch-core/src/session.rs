//! Brokerage session management.
//!
//! [`Session`] is the "ensure a valid session or fail with auth-required"
//! collaborator. It logs in lazily on first use, keeps the bearer token in
//! memory and, when a session path is configured, persists it to
//! `<session_path>/robinhood.json` so the next process can skip the login.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest};
use crate::source::SourceError;

const SESSION_FILE_NAME: &str = "robinhood.json";
const OAUTH_CLIENT_ID: &str = "c82SH0WZOsabOXGP2sxqcj34FxkvfnWRZBKlBjFS";
const TOKEN_LIFETIME_SECS: u64 = 86_400;

const MISSING_CREDENTIALS: &str = "Authentication required. Please set RH_USERNAME and \
RH_PASSWORD, or ensure a valid session cache exists. You may need to refresh your session \
in the Robinhood app.";
const LOGIN_FAILED: &str = "Login failed. Please check your credentials or refresh your \
session in the Robinhood app.";
const CHALLENGE_REQUIRED: &str = "Authentication challenge required. Please refresh your \
session in the Robinhood app, or enable MFA fallback with RH_ALLOW_MFA=1 and provide \
mfa_code.";

/// Bearer token plus the device token it was issued to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub device_token: String,
}

fn default_token_type() -> String {
    String::from("Bearer")
}

impl AuthToken {
    pub fn auth(&self) -> HttpAuth {
        HttpAuth::BearerToken(self.access_token.clone())
    }
}

/// Lazily authenticated brokerage session.
pub struct Session {
    config: SessionConfig,
    http_client: Arc<dyn HttpClient>,
    device_token: String,
    token: Mutex<Option<AuthToken>>,
}

impl Session {
    pub fn new(config: SessionConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
            device_token: Uuid::new_v4().to_string(),
            token: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns a valid token, restoring or logging in as needed.
    pub async fn ensure(&self) -> Result<AuthToken, SourceError> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            debug!("session already active, skipping login");
            return Ok(token.clone());
        }

        match self.load_persisted().await {
            Ok(Some(token)) => {
                debug!("restored persisted session token");
                *guard = Some(token.clone());
                return Ok(token);
            }
            Ok(None) => {}
            Err(error) => warn!(%error, "ignoring unreadable session file"),
        }

        let token = self.login().await?;
        if let Err(error) = self.persist(&token).await {
            warn!(%error, "failed to persist session token");
        }
        *guard = Some(token.clone());
        Ok(token)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.lock().await.is_some()
    }

    /// Drops a token the upstream rejected, in memory and on disk, so the
    /// next call logs in again instead of restoring it.
    pub async fn invalidate(&self) {
        let mut guard = self.token.lock().await;
        *guard = None;
        self.remove_persisted().await;
    }

    /// Like [`invalidate`](Self::invalidate), but a no-op when `rejected` has
    /// already been replaced by a newer login.
    pub async fn reject(&self, rejected: &AuthToken) {
        let mut guard = self.token.lock().await;
        if guard
            .as_ref()
            .is_some_and(|current| current.access_token != rejected.access_token)
        {
            debug!("rejected token already replaced");
            return;
        }
        *guard = None;
        self.remove_persisted().await;
    }

    /// Clears the in-memory token and removes the persisted file.
    pub async fn logout(&self) {
        debug!("logging out and clearing session");
        self.invalidate().await;
    }

    fn session_file(&self) -> Option<PathBuf> {
        self.config
            .session_path
            .as_ref()
            .map(|dir| dir.join(SESSION_FILE_NAME))
    }

    async fn load_persisted(&self) -> Result<Option<AuthToken>, CoreError> {
        let Some(path) = self.session_file() else {
            return Ok(None);
        };

        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        let token: AuthToken = serde_json::from_str(&raw)?;
        if token.access_token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token))
    }

    async fn persist(&self, token: &AuthToken) -> Result<(), CoreError> {
        let Some(path) = self.session_file() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, serde_json::to_vec_pretty(token)?).await?;
        Ok(())
    }

    async fn remove_persisted(&self) {
        let Some(path) = self.session_file() else {
            return;
        };
        match fs::remove_file(&path).await {
            Ok(()) => debug!("removed persisted session token"),
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(error) => warn!(%error, "failed to remove session file"),
        }
    }

    async fn login(&self) -> Result<AuthToken, SourceError> {
        let (Some(username), Some(password)) = (&self.config.username, &self.config.password)
        else {
            warn!("authentication failed: missing credentials");
            return Err(SourceError::auth_required(MISSING_CREDENTIALS));
        };

        let mut body = json!({
            "client_id": OAUTH_CLIENT_ID,
            "expires_in": TOKEN_LIFETIME_SECS,
            "grant_type": "password",
            "scope": "internal",
            "username": username,
            "password": password,
            "device_token": self.device_token,
            "challenge_type": "sms",
        });
        let mfa_code = self
            .config
            .mfa_code
            .as_deref()
            .filter(|_| self.config.allow_mfa);
        if let Some(code) = mfa_code {
            body["mfa_code"] = Value::from(code);
        }

        info!(username = %username, "authenticating");
        debug!(
            persisted = self.config.session_path.is_some(),
            mfa = mfa_code.is_some(),
            "login request"
        );

        let request = HttpRequest::post_json(format!("{}/oauth2/token/", self.config.base_url()), &body)
            .with_timeout_ms(self.config.timeout_ms);
        let response = self.http_client.execute(request).await.map_err(|error| {
            warn!(error = %error, "authentication transport error");
            SourceError::unavailable(format!("Failed to authenticate: {}", error.message()))
        })?;

        let payload: Value = serde_json::from_str(&response.body).unwrap_or(Value::Null);
        if is_challenge(&payload) || response.body.to_ascii_lowercase().contains("challenge") {
            warn!(username = %username, "authentication challenge required");
            return Err(SourceError::auth_required(CHALLENGE_REQUIRED));
        }

        let access_token = payload
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty());
        let Some(access_token) = access_token.filter(|_| response.is_success()) else {
            warn!(username = %username, status = response.status, "authentication failed");
            return Err(SourceError::auth_required(LOGIN_FAILED));
        };

        info!(username = %username, "authentication successful");
        Ok(AuthToken {
            access_token: access_token.to_owned(),
            token_type: payload
                .get("token_type")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(default_token_type),
            refresh_token: payload
                .get("refresh_token")
                .and_then(Value::as_str)
                .map(str::to_owned),
            device_token: self.device_token.clone(),
        })
    }
}

fn is_challenge(payload: &Value) -> bool {
    payload.get("challenge").is_some_and(|value| !value.is_null())
        || payload.get("verification_workflow").is_some_and(|value| !value.is_null())
        || payload
            .get("mfa_required")
            .and_then(Value::as_bool)
            .unwrap_or(false)
}
