//! Client configuration, loaded from the environment.
//!
//! All knobs are environment variables with sensible defaults; a `.env` file
//! in the working directory is honored.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the remote watermark service.
    pub api_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Directory holding the durable session entry.
    pub state_dir: PathBuf,
}

impl ClientConfig {
    /// Load configuration from `IVSGN_*` environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_url = env::var("IVSGN_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let request_timeout_secs = match env::var("IVSGN_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("Invalid IVSGN_TIMEOUT_SECS: {}", raw))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let state_dir = match env::var("IVSGN_STATE_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => default_state_dir(),
        };

        Ok(Self {
            api_url,
            request_timeout_secs,
            state_dir,
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            state_dir: default_state_dir(),
        }
    }
}

fn default_state_dir() -> PathBuf {
    env::var("HOME")
        .map(|home| PathBuf::from(home).join(".invisignia"))
        .unwrap_or_else(|_| PathBuf::from(".invisignia"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.state_dir.ends_with(".invisignia"));
    }
}
