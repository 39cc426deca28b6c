//! EventSub webhook callback.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use twitch_client::eventsub::{
    self, EVENT_REWARD_REDEMPTION, HEADER_MESSAGE_ID, HEADER_MESSAGE_SIGNATURE,
    HEADER_MESSAGE_TIMESTAMP, HEADER_MESSAGE_TYPE, RedemptionEvent, WebhookMessage,
};

use crate::app::SharedState;

use super::err_json;

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// POST /api/eventsub
pub async fn webhook(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let (Some(message_id), Some(timestamp), Some(signature), Some(message_type)) = (
        header(&headers, HEADER_MESSAGE_ID),
        header(&headers, HEADER_MESSAGE_TIMESTAMP),
        header(&headers, HEADER_MESSAGE_SIGNATURE),
        header(&headers, HEADER_MESSAGE_TYPE),
    ) else {
        return err_json(400, "missing EventSub headers").into_response();
    };

    let secret = &state.config().eventsub_secret;
    if secret.is_empty() {
        tracing::error!("EVENTSUB_SECRET not set, rejecting webhook");
        return err_json(500, "webhook secret not configured").into_response();
    }
    if !eventsub::verify_signature(secret, message_id, timestamp, &body, signature) {
        tracing::warn!(message_id, "EventSub signature mismatch");
        return err_json(403, "invalid signature").into_response();
    }
    if !eventsub::is_fresh(timestamp, chrono::Utc::now()) {
        tracing::warn!(message_id, timestamp, "Stale EventSub message rejected");
        return err_json(403, "stale message").into_response();
    }

    let message = match eventsub::parse_webhook(message_type, &body) {
        Ok(m) => m,
        Err(e) => {
            tracing::warn!(message_id, error = %e, "Unreadable EventSub message");
            return err_json(400, &e.to_string()).into_response();
        }
    };

    match message {
        WebhookMessage::Verification {
            subscription,
            challenge,
        } => {
            tracing::info!(subscription_id = %subscription.id, kind = %subscription.kind, "EventSub callback verified");
            (StatusCode::OK, challenge).into_response()
        }
        WebhookMessage::Notification {
            subscription,
            event,
        } => {
            if subscription.kind != EVENT_REWARD_REDEMPTION {
                tracing::debug!(kind = %subscription.kind, "Ignoring EventSub notification");
                return StatusCode::NO_CONTENT.into_response();
            }
            let redemption: RedemptionEvent = match serde_json::from_value(event) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(message_id, error = %e, "Malformed redemption event");
                    return err_json(400, "malformed redemption event").into_response();
                }
            };

            // Twitch expects a fast 2xx; the redemption is processed in the background.
            let s = state.clone();
            tokio::spawn(async move {
                let outcome = s.chief().process_redemption(&redemption).await;
                tracing::debug!(
                    redemption_id = %redemption.id,
                    outcome = ?outcome,
                    "Redemption processed"
                );
            });
            StatusCode::NO_CONTENT.into_response()
        }
        WebhookMessage::Revocation { subscription } => {
            tracing::warn!(
                subscription_id = %subscription.id,
                status = %subscription.status,
                condition = %subscription.condition,
                "EventSub subscription revoked"
            );
            StatusCode::NO_CONTENT.into_response()
        }
    }
}
