//! Twitch OAuth flow for channel owners.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{Html, Redirect};
use emote_db::UserToken;
use serde::Deserialize;
use serde_json::Value;
use twitch_client::TwitchError;

use crate::app::SharedState;

use super::err_json;

type HandlerError = (axum::http::StatusCode, Json<Value>);

fn map_twitch_error(err: TwitchError) -> HandlerError {
    match err {
        TwitchError::AuthRequired => err_json(401, "Authentication required"),
        TwitchError::TokenRefreshFailed(message) => err_json(401, &message),
        TwitchError::ApiError { status, message } => err_json(status, &message),
        other => err_json(500, &other.to_string()),
    }
}

fn ensure_credentials(state: &SharedState) -> Result<(), HandlerError> {
    let config = state.config();
    if config.client_id.is_empty() || config.client_secret.is_empty() {
        return Err(err_json(400, "Twitch credentials not configured"));
    }
    Ok(())
}

/// GET /api/auth – Redirect to Twitch OAuth
pub async fn auth_redirect(State(state): State<SharedState>) -> Result<Redirect, HandlerError> {
    ensure_credentials(&state)?;
    let url = state
        .auth()
        .get_auth_url()
        .map_err(|e| err_json(500, &e.to_string()))?;
    Ok(Redirect::temporary(&url))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// GET /api/callback – Exchange the OAuth code and store the owner's token.
pub async fn callback(
    State(state): State<SharedState>,
    Query(q): Query<CallbackQuery>,
) -> Result<Html<String>, HandlerError> {
    if let Some(error) = q.error {
        let desc = q.error_description.unwrap_or_default();
        tracing::warn!(error = %error, desc = %desc, "OAuth authorization denied");
        return Err(err_json(400, &format!("{error}: {desc}")));
    }
    let code = q
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| err_json(400, "OAuth code missing"))?;
    ensure_credentials(&state)?;

    let token = state
        .auth()
        .exchange_code(&code)
        .await
        .map_err(map_twitch_error)?;
    let user = state
        .auth()
        .validate_token(&token.access_token)
        .await
        .map_err(map_twitch_error)?;

    let record = UserToken {
        user_id: user.user_id.clone(),
        login: user.login.clone(),
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        scope: token.scope,
        expires_at: token.expires_at,
    };
    state
        .repo()
        .blocking(move |db| db.save_user_token(&record))
        .await
        .map_err(|e| err_json(500, &e.to_string()))?;
    tracing::info!(user_id = %user.user_id, login = %user.login, "OAuth token saved");

    Ok(Html(
        r#"<!DOCTYPE html><html><body>
<h2>Authenticated</h2><p>You can close this window.</p>
<script>setTimeout(()=>window.close(),2000)</script></body></html>"#
            .to_string(),
    ))
}
