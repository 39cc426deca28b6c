//! Runtime application configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_SERVER_PORT: u16 = 8035;
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub eventsub_callback_url: String,
    pub eventsub_secret: String,
    pub bot_user_id: String,
    pub seventv_token: String,
    pub bttv_token: String,
    pub server_port: u16,
    pub data_dir: PathBuf,
    pub operation_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            eventsub_callback_url: String::new(),
            eventsub_secret: String::new(),
            bot_user_id: String::new(),
            seventv_token: String::new(),
            bttv_token: String::new(),
            server_port: DEFAULT_SERVER_PORT,
            data_dir: default_data_dir(),
            operation_timeout_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let g = |key: &str| -> String { lookup(key).unwrap_or_default().trim().to_string() };

        let server_port = parse_u16(&g("SERVER_PORT"), DEFAULT_SERVER_PORT);
        let operation_timeout_secs = match g("OPERATION_TIMEOUT_SECS").parse::<u64>() {
            Ok(v) if v > 0 => v,
            _ => DEFAULT_OPERATION_TIMEOUT_SECS,
        };
        let data_dir = {
            let d = g("DATA_DIR");
            if d.is_empty() {
                default_data_dir()
            } else {
                PathBuf::from(d)
            }
        };
        let redirect_uri = {
            let r = g("REDIRECT_URI");
            if r.is_empty() {
                format!("http://localhost:{server_port}/api/callback")
            } else {
                r
            }
        };

        Self {
            client_id: g("CLIENT_ID"),
            client_secret: g("CLIENT_SECRET"),
            redirect_uri,
            eventsub_callback_url: g("EVENTSUB_CALLBACK_URL"),
            eventsub_secret: g("EVENTSUB_SECRET"),
            bot_user_id: g("BOT_USER_ID"),
            seventv_token: g("SEVENTV_TOKEN"),
            bttv_token: g("BTTV_TOKEN"),
            server_port,
            data_dir,
            operation_timeout_secs,
        }
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("emotechief.db")
    }
}

/// `~/.emotechief`, or `./.emotechief` when no home directory is known.
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".emotechief")
}

fn parse_u16(s: &str, default: u16) -> u16 {
    s.parse().unwrap_or(default)
}
