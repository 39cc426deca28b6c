//! Startup checks for missing or suspicious settings.

use serde::Serialize;

use super::AppConfig;

/// Feature availability derived from the loaded configuration.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FeatureStatus {
    pub twitch_configured: bool,
    pub eventsub_configured: bool,
    pub chat_configured: bool,
    pub seventv_configured: bool,
    pub bttv_configured: bool,
    pub missing_settings: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn check_feature_status(config: &AppConfig) -> FeatureStatus {
    let mut missing = Vec::new();
    let mut warnings = Vec::new();

    let mut require = |key: &str, value: &str| {
        if value.is_empty() {
            missing.push(key.to_string());
        }
    };
    require("CLIENT_ID", &config.client_id);
    require("CLIENT_SECRET", &config.client_secret);
    require("EVENTSUB_CALLBACK_URL", &config.eventsub_callback_url);
    require("EVENTSUB_SECRET", &config.eventsub_secret);

    // Twitch rejects webhook secrets outside 10..=100 ASCII characters.
    let secret_len = config.eventsub_secret.len();
    if secret_len > 0 && !(10..=100).contains(&secret_len) {
        warnings.push("EVENTSUB_SECRET must be between 10 and 100 characters".into());
    }
    if !config.eventsub_callback_url.is_empty()
        && !config.eventsub_callback_url.starts_with("https://")
    {
        warnings.push("EVENTSUB_CALLBACK_URL must use https".into());
    }
    if config.bot_user_id.is_empty() {
        warnings.push("BOT_USER_ID not set, chat feedback disabled".into());
    }
    if config.seventv_token.is_empty() {
        warnings.push("SEVENTV_TOKEN not set, 7TV redemptions will be refunded".into());
    }
    if config.bttv_token.is_empty() {
        warnings.push("BTTV_TOKEN not set, BetterTTV redemptions will be refunded".into());
    }

    FeatureStatus {
        twitch_configured: !config.client_id.is_empty() && !config.client_secret.is_empty(),
        eventsub_configured: !config.eventsub_callback_url.is_empty()
            && (10..=100).contains(&secret_len),
        chat_configured: !config.bot_user_id.is_empty(),
        seventv_configured: !config.seventv_token.is_empty(),
        bttv_configured: !config.bttv_token.is_empty(),
        missing_settings: missing,
        warnings,
    }
}
