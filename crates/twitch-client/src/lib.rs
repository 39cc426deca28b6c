//! Twitch integration client library.
//!
//! Provides OAuth authentication, the Helix REST calls used for
//! channel point redemptions, and EventSub webhook handling.

pub mod api;
pub mod auth;
pub mod eventsub;

use serde::{Deserialize, Serialize};

/// Token data for OAuth authentication.
///
/// The caller is responsible for persisting this (e.g. via emote-db).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_at: i64,
}

/// Unified error type for the twitch-client crate.
#[derive(Debug, thiserror::Error)]
pub enum TwitchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication required: no valid token")]
    AuthRequired,

    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    #[error("Twitch API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("EventSub error: {0}")]
    EventSub(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// OAuth scopes required by this application.
pub const SCOPES: &[&str] = &[
    "channel:read:redemptions",
    "channel:manage:redemptions",
    "channel:bot",
];
