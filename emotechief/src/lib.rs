//! EmoteChief: channel point redemptions that add emotes to a channel's
//! BetterTTV or 7TV emote set.

pub mod app;
pub mod collaborators;
pub mod config;
pub mod emotechief;
pub mod repository;
pub mod server;
pub mod user_config;

use emote_db::Database;

use config::{AppConfig, check_feature_status};

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Load config, open the database and report missing settings.
pub fn init_foundation() -> Result<(Database, AppConfig), anyhow::Error> {
    load_dotenv();
    let config = AppConfig::from_env();

    std::fs::create_dir_all(&config.data_dir)?;
    let db_path = config.db_path();
    tracing::info!("Opening database at {}", db_path.display());
    let db = Database::open(&db_path)?;

    let status = check_feature_status(&config);
    if !status.missing_settings.is_empty() {
        tracing::warn!(
            "Missing settings: {:?}, warnings: {:?}",
            status.missing_settings,
            status.warnings
        );
    } else if !status.warnings.is_empty() {
        tracing::warn!("Configuration warnings: {:?}", status.warnings);
    }

    tracing::info!(
        port = config.server_port,
        timeout_secs = config.operation_timeout_secs,
        "Settings loaded"
    );
    Ok((db, config))
}
