//! Configuration for helix

use std::path::PathBuf;
use std::time::Duration;

/// Default backend address
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Placeholder identity until authentication exists
pub const DEFAULT_USER_ID: &str = "user_001";
pub const DEFAULT_ORG_ID: &str = "org_001";

/// Helix configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL
    pub api_url: String,
    /// Recruiter identity sent with chats and saves
    pub user_id: String,
    pub org_id: String,
    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
    /// Directory for helix data (logs, etc.)
    pub data_dir: PathBuf,
    /// TUI log file path
    pub log_path: PathBuf,
}

impl Config {
    /// Create config from environment or defaults
    pub fn from_env() -> Self {
        let helix_root = std::env::var("HELIX_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".helix")
            });

        let api_url = std::env::var("HELIX_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let user_id = std::env::var("HELIX_USER_ID").unwrap_or_else(|_| DEFAULT_USER_ID.to_string());
        let org_id = std::env::var("HELIX_ORG_ID").unwrap_or_else(|_| DEFAULT_ORG_ID.to_string());

        let request_timeout = std::env::var("HELIX_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| parse_timeout(&v));

        let log_path = helix_root.join("helix.log");

        Self {
            api_url,
            user_id,
            org_id,
            request_timeout,
            data_dir: helix_root,
            log_path,
        }
    }

    /// Ensure all directories exist
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Parse a timeout in whole seconds; zero or garbage disables it
fn parse_timeout(value: &str) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(0) => None,
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            tracing::warn!("Ignoring invalid HELIX_REQUEST_TIMEOUT_SECS: {}", value);
            None
        }
    }
}
