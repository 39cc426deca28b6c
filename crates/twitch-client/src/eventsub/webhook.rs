use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::*;
use crate::TwitchError;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_PREFIX: &str = "sha256=";

/// A classified, signature-checked webhook delivery.
#[derive(Debug, Clone)]
pub enum WebhookMessage {
    /// Twitch is confirming the callback; echo `challenge` as plain text.
    Verification {
        subscription: WebhookSubscription,
        challenge: String,
    },
    Notification {
        subscription: WebhookSubscription,
        event: serde_json::Value,
    },
    Revocation { subscription: WebhookSubscription },
}

#[derive(Debug, Deserialize)]
struct Envelope {
    subscription: WebhookSubscription,
    #[serde(default)]
    challenge: Option<String>,
    #[serde(default)]
    event: Option<serde_json::Value>,
}

/// Check `Twitch-Eventsub-Message-Signature` against the shared secret.
///
/// The signed payload is `message_id || timestamp || body`. Comparison is
/// constant time.
pub fn verify_signature(
    secret: &str,
    message_id: &str,
    timestamp: &str,
    body: &[u8],
    signature: &str,
) -> bool {
    let Some(hex_sig) = signature.strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_sig) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(message_id.as_bytes());
    mac.update(timestamp.as_bytes());
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Compute the signature header value for a payload.
pub fn sign(secret: &str, message_id: &str, timestamp: &str, body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(message_id.as_bytes());
    mac.update(timestamp.as_bytes());
    mac.update(body);
    Some(format!(
        "{SIGNATURE_PREFIX}{}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Whether an RFC 3339 message timestamp is within the replay window.
pub fn is_fresh(timestamp: &str, now: DateTime<Utc>) -> bool {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(ts) => (now - ts.with_timezone(&Utc)).num_seconds().abs() <= MAX_MESSAGE_AGE_SECS,
        Err(_) => false,
    }
}

/// Decode a webhook body according to its `Twitch-Eventsub-Message-Type`.
pub fn parse_webhook(message_type: &str, body: &[u8]) -> Result<WebhookMessage, TwitchError> {
    let envelope: Envelope = serde_json::from_slice(body)?;
    match message_type {
        MESSAGE_TYPE_VERIFICATION => {
            let challenge = envelope
                .challenge
                .ok_or_else(|| TwitchError::EventSub("verification without challenge".into()))?;
            Ok(WebhookMessage::Verification {
                subscription: envelope.subscription,
                challenge,
            })
        }
        MESSAGE_TYPE_NOTIFICATION => {
            let event = envelope
                .event
                .ok_or_else(|| TwitchError::EventSub("notification without event".into()))?;
            Ok(WebhookMessage::Notification {
                subscription: envelope.subscription,
                event,
            })
        }
        MESSAGE_TYPE_REVOCATION => Ok(WebhookMessage::Revocation {
            subscription: envelope.subscription,
        }),
        other => Err(TwitchError::EventSub(format!(
            "unknown message type: {other}"
        ))),
    }
}
