//! Gmail OAuth2 token management
//!
//! Consumes an already-provisioned OAuth token and keeps it fresh
//! against Google's token endpoint. Token persistence goes through an
//! injected [`TokenStore`] so tests can supply an in-memory double.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::GmailCredentials;
use crate::error::AuthorizationError;

/// Persisted OAuth token data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix seconds after which the access token is no longer valid
    pub expiry_date: Option<i64>,
}

/// Token response from Google
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

/// Capability for loading and persisting OAuth tokens
pub trait TokenStore {
    fn load(&self) -> Result<StoredToken>;
    fn save(&self, token: &StoredToken) -> Result<()>;
}

/// Token store backed by a JSON file (~/.config/mailwatch/gmail-tokens.json)
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    const TOKEN_FILE: &'static str = "gmail-tokens.json";

    /// Create a store at the default token path
    pub fn new() -> Result<Self> {
        let path =
            crate::config::config_path(Self::TOKEN_FILE).context("Could not determine config directory")?;
        Ok(Self { path })
    }

    /// Create a store at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<StoredToken> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read token file: {}", self.path.display()))?;
        let token: StoredToken = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse token file: {}", self.path.display()))?;
        Ok(token)
    }

    fn save(&self, token: &StoredToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create token directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(token)?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write token file: {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory token store for tests and embedders that manage persistence
/// themselves
pub struct MemoryTokenStore {
    token: Mutex<Option<StoredToken>>,
}

impl MemoryTokenStore {
    pub fn new(token: StoredToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }

    pub fn empty() -> Self {
        Self {
            token: Mutex::new(None),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<StoredToken> {
        self.token
            .lock()
            .unwrap()
            .clone()
            .context("no token stored")
    }

    fn save(&self, token: &StoredToken) -> Result<()> {
        *self.token.lock().unwrap() = Some(token.clone());
        Ok(())
    }
}

/// OAuth2 access-token management for the Gmail API
pub struct GmailAuth<'a> {
    credentials: GmailCredentials,
    store: &'a dyn TokenStore,
    token_url: String,
}

impl<'a> GmailAuth<'a> {
    const TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Seconds of remaining validity below which the token is refreshed
    const EXPIRY_BUFFER_SECS: i64 = 300;

    pub fn new(credentials: GmailCredentials, store: &'a dyn TokenStore) -> Self {
        Self {
            credentials,
            store,
            token_url: Self::TOKEN_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_token_url(credentials: GmailCredentials, store: &'a dyn TokenStore, url: &str) -> Self {
        Self {
            credentials,
            store,
            token_url: url.to_string(),
        }
    }

    /// Get a valid access token, refreshing through the token store as
    /// needed
    pub fn get_access_token(&self) -> Result<String> {
        let token = self
            .store
            .load()
            .map_err(|e| AuthorizationError::new(format!("could not load token: {e}")))?;

        // Still valid (with a buffer against clock skew and in-flight time)
        if let Some(expiry) = token.expiry_date {
            let now = chrono::Utc::now().timestamp();
            if expiry > now + Self::EXPIRY_BUFFER_SECS {
                return Ok(token.access_token);
            }
        }

        let refreshed = self.refresh(&token)?;
        Ok(refreshed.access_token)
    }

    /// Force a refresh of the stored token and persist the result
    pub fn refresh_stored_token(&self) -> Result<()> {
        let token = self
            .store
            .load()
            .map_err(|e| AuthorizationError::new(format!("could not load token: {e}")))?;
        self.refresh(&token)?;
        Ok(())
    }

    /// Exchange the refresh token for a new access token and write it
    /// back through the store
    fn refresh(&self, token: &StoredToken) -> Result<StoredToken> {
        let refresh_token = token.refresh_token.as_deref().ok_or_else(|| {
            AuthorizationError::new("access token expired and no refresh token is stored")
        })?;

        let mut response = ureq::post(&self.token_url)
            .send_form([
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .map_err(|e| AuthorizationError::new(format!("token refresh failed: {e}")))?;

        let refreshed: TokenResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse token refresh response")?;

        let stored = StoredToken {
            access_token: refreshed.access_token,
            // Google omits the refresh token on refresh responses
            refresh_token: refreshed
                .refresh_token
                .or_else(|| Some(refresh_token.to_string())),
            expiry_date: refreshed
                .expires_in
                .map(|d| chrono::Utc::now().timestamp() + d as i64),
        };
        self.store.save(&stored)?;
        Ok(stored)
    }
}
