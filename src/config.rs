//! Configuration loading for mail access
//!
//! Supports loading OAuth credentials from (in order of priority):
//! 1. JSON file (Google Cloud Console format)
//! 2. Runtime environment variables (fallback)
//!
//! Shared config files live under ~/.config/mailwatch/.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Credentials filename in the mailwatch config directory
const CREDENTIALS_FILE: &str = "google-credentials.json";

/// Get the mailwatch config directory (~/.config/mailwatch/)
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mailwatch"))
}

/// Get the path to a file within the mailwatch config directory
pub fn config_path(filename: &str) -> Option<PathBuf> {
    config_dir().map(|p| p.join(filename))
}

/// OAuth credentials for Gmail API access
#[derive(Debug, Clone)]
pub struct GmailCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Google Cloud Console credential file format (installed app)
#[derive(Deserialize)]
struct GoogleCredentialFile {
    installed: Option<InstalledCredentials>,
    web: Option<InstalledCredentials>,
}

#[derive(Deserialize)]
struct InstalledCredentials {
    client_id: String,
    client_secret: String,
}

impl GmailCredentials {
    /// Load credentials from the default config file, falling back to
    /// environment variables
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path(CREDENTIALS_FILE)
            && path.exists()
        {
            return Self::from_file(&path);
        }
        Self::from_env()
    }

    /// Load credentials from a specific JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file: {}", path.display()))?;
        Self::from_json(&content)
    }

    /// Parse credentials from JSON (Google Cloud Console format)
    pub fn from_json(json: &str) -> Result<Self> {
        let creds: GoogleCredentialFile =
            serde_json::from_str(json).context("Failed to parse credentials JSON")?;

        // Support both "installed" (desktop) and "web" credential types
        let installed = creds
            .installed
            .or(creds.web)
            .context("Credentials file missing 'installed' or 'web' section")?;

        Ok(Self {
            client_id: installed.client_id,
            client_secret: installed.client_secret,
        })
    }

    /// Load credentials from environment variables
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("GMAIL_CLIENT_ID")
            .context("GMAIL_CLIENT_ID environment variable not set")?;
        let client_secret = std::env::var("GMAIL_CLIENT_SECRET")
            .context("GMAIL_CLIENT_SECRET environment variable not set")?;

        Ok(Self {
            client_id,
            client_secret,
        })
    }
}
