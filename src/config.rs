//! Environment-driven runtime configuration.

use std::{env, path::PathBuf, time::Duration};

use tracing::warn;

/// Directory holding the persisted registry and session documents.
const DEFAULT_DATA_DIR: &str = "data";
/// File name of the registry document inside the data directory.
const REGISTRY_FILE: &str = "servers.json";
/// File name of the session document inside the data directory.
const SESSION_FILE: &str = "status_state.json";
/// Interval between periodic status updates.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
/// Status API of the provider.
const DEFAULT_API_URL: &str = "https://api.battlemetrics.com";
/// Public site of the provider, scraped for the in-game clock.
const DEFAULT_PAGE_URL: &str = "https://www.battlemetrics.com";
/// Game slug used in the provider's server page URLs.
const DEFAULT_GAME: &str = "dayz";

/// Immutable runtime configuration shared across the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// TCP port the HTTP API listens on.
    pub port: u16,
    /// Directory holding the persisted documents.
    pub data_dir: PathBuf,
    /// Interval between periodic status updates.
    pub poll_interval: Duration,
    /// Base URL of the provider's status API.
    pub provider_api_url: String,
    /// Base URL of the provider's public site.
    pub provider_page_url: String,
    /// Game slug used in provider page URLs.
    pub provider_game: String,
    /// Bearer token required on mutating API routes; `None` leaves them open.
    pub admin_token: Option<String>,
    /// Credentials for the display backend.
    pub display: DisplayConfig,
}

/// Credentials for the chat platform hosting the display message.
#[derive(Debug, Clone, Default)]
pub struct DisplayConfig {
    /// Bot token used against the platform's REST API.
    pub bot_token: Option<String>,
    /// Channel the display message lives in.
    pub channel_id: Option<String>,
}

impl AppConfig {
    /// Build the configuration from environment variables, falling back to
    /// built-in defaults for everything that is not set.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .or_else(|_| env::var("SERVER_PORT"))
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(8080);

        let data_dir = env::var_os("DATA_DIR")
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let poll_interval = env::var("POLL_INTERVAL_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let admin_token = non_empty_var("ADMIN_TOKEN");
        if admin_token.is_none() {
            warn!("ADMIN_TOKEN is not set; mutating API routes are open to every caller");
        }

        Self {
            port,
            data_dir,
            poll_interval,
            provider_api_url: non_empty_var("PROVIDER_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            provider_page_url: non_empty_var("PROVIDER_PAGE_URL")
                .unwrap_or_else(|| DEFAULT_PAGE_URL.to_string()),
            provider_game: non_empty_var("PROVIDER_GAME").unwrap_or_else(|| DEFAULT_GAME.to_string()),
            admin_token,
            display: DisplayConfig {
                bot_token: non_empty_var("DISCORD_BOT_TOKEN"),
                channel_id: non_empty_var("DISCORD_CHANNEL_ID"),
            },
        }
    }

    /// Path of the persisted registry document.
    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join(REGISTRY_FILE)
    }

    /// Path of the persisted session document.
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }
}

/// Read an environment variable, treating empty values as unset.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
