//! Bearer token authentication for the user-facing API.

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde_json::Value;

use crate::app::SharedState;
use crate::collaborators::CollaboratorError;

use super::api::err_json;

/// The Twitch user behind the request's `Authorization: Bearer` token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub login: String,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| err_json(401, "bad authentication"))?;

        let timeout = state.config().operation_timeout();
        let validated = tokio::time::timeout(timeout, state.validator().validate(token))
            .await
            .map_err(|_| err_json(500, "token validation timed out"))?;

        match validated {
            Ok(user) => Ok(Self {
                user_id: user.user_id,
                login: user.login,
            }),
            Err(CollaboratorError::Unauthorized) => Err(err_json(401, "bad authentication")),
            Err(e) => {
                tracing::warn!(error = %e, "Token validation failed");
                Err(err_json(500, "token validation failed"))
            }
        }
    }
}
