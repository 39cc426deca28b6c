use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use emote_db::{Database, EmoteChangeType, RewardType};
use serde_json::{Value, json};
use tower::ServiceExt;
use twitch_client::api::RedemptionStatus;
use twitch_client::auth::TwitchAuth;
use twitch_client::eventsub::{
    self, EVENT_REWARD_REDEMPTION, HEADER_MESSAGE_ID, HEADER_MESSAGE_SIGNATURE,
    HEADER_MESSAGE_TIMESTAMP, HEADER_MESSAGE_TYPE, MESSAGE_TYPE_NOTIFICATION,
    MESSAGE_TYPE_VERIFICATION,
};

use crate::app::{Services, SharedState};
use crate::collaborators::{
    AuthenticatedUser, ChatNotifier, CollaboratorError, EmoteProvider, EmoteProviders,
    RedemptionUpdater, SubscriptionManager, TokenValidator,
};
use crate::config::AppConfig;
use crate::emotechief::EmoteChief;
use crate::repository::{EmoteLedger, SqliteRepository, UserConfigRepository};
use crate::server::router::create_router;
use crate::user_config::ConfigStore;

const GOOD_TOKEN: &str = "good-token";
const OWNER_ID: &str = "1337";
const WEBHOOK_SECRET: &str = "webhook-secret-for-tests";

struct Noop;

#[async_trait]
impl EmoteProvider for Noop {
    async fn add_emote(&self, _: &str, _: &str) -> Result<(), CollaboratorError> {
        Ok(())
    }

    async fn remove_emote(&self, _: &str, _: &str) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

#[async_trait]
impl RedemptionUpdater for Noop {
    async fn set_status(
        &self,
        _: &str,
        _: &str,
        _: &str,
        _: RedemptionStatus,
    ) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

#[async_trait]
impl SubscriptionManager for Noop {
    async fn subscribe(&self, _: &str) -> Result<(), CollaboratorError> {
        Ok(())
    }

    async fn unsubscribe(&self, _: &str) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

#[async_trait]
impl ChatNotifier for Noop {
    async fn say(&self, _: &str, _: &str) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

#[async_trait]
impl TokenValidator for Noop {
    async fn validate(&self, access_token: &str) -> Result<AuthenticatedUser, CollaboratorError> {
        if access_token == GOOD_TOKEN {
            Ok(AuthenticatedUser {
                user_id: OWNER_ID.into(),
                login: "streamer".into(),
            })
        } else {
            Err(CollaboratorError::Unauthorized)
        }
    }
}

struct SubscribeFails;

#[async_trait]
impl SubscriptionManager for SubscribeFails {
    async fn subscribe(&self, _: &str) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::NotConfigured("EVENTSUB_CALLBACK_URL"))
    }

    async fn unsubscribe(&self, _: &str) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

fn test_app() -> (Router, SqliteRepository) {
    test_app_with(Arc::new(Noop))
}

fn test_app_with(subscriptions: Arc<dyn SubscriptionManager>) -> (Router, SqliteRepository) {
    let repo = SqliteRepository::new(Database::open_in_memory().unwrap());
    let noop = Arc::new(Noop);
    let timeout = Duration::from_secs(5);
    let config = AppConfig {
        eventsub_secret: WEBHOOK_SECRET.into(),
        ..AppConfig::default()
    };
    let services = Services {
        chief: EmoteChief::new(
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            EmoteProviders {
                bttv: noop.clone(),
                seventv: noop.clone(),
            },
            noop.clone(),
            noop.clone(),
            timeout,
        ),
        config_store: ConfigStore::new(Arc::new(repo.clone()), subscriptions, timeout),
        validator: noop,
    };
    let auth = Arc::new(TwitchAuth::new(
        String::new(),
        String::new(),
        "http://localhost/api/callback".into(),
    ));
    let state = SharedState::with_services(config, repo.clone(), auth, services);
    (create_router(state), repo)
}

fn authed(method: &str, uri: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {GOOD_TOKEN}"))
        .header("Content-Type", "application/json")
        .body(body)
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, req).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn signed_webhook(message_type: &str, body: &str) -> Request<Body> {
    let message_id = "msg-1";
    let timestamp = chrono::Utc::now().to_rfc3339();
    let signature =
        eventsub::sign(WEBHOOK_SECRET, message_id, &timestamp, body.as_bytes()).unwrap();
    Request::builder()
        .method("POST")
        .uri("/api/eventsub")
        .header(HEADER_MESSAGE_ID, message_id)
        .header(HEADER_MESSAGE_TIMESTAMP, timestamp)
        .header(HEADER_MESSAGE_SIGNATURE, signature)
        .header(HEADER_MESSAGE_TYPE, message_type)
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn userconfig_requires_bearer_token() {
    let (app, _) = test_app();

    let req = Request::builder()
        .uri("/api/userconfig")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");

    let req = Request::builder()
        .uri("/api/userconfig")
        .header("Authorization", "Bearer wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn userconfig_get_returns_default() {
    let (app, _) = test_app();
    let (status, body) = send_json(&app, authed("GET", "/api/userconfig", Body::empty())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Redemptions"]["Bttv"]["Title"], "Bttv emote");
    assert_eq!(body["Redemptions"]["Bttv"]["Active"], false);
    assert_eq!(body["Editors"], json!([]));
    assert_eq!(body["Protected"]["EditorFor"], json!([]));
}

#[tokio::test]
async fn userconfig_post_discards_protected() {
    let (app, _) = test_app();
    let payload = json!({
        "Redemptions": { "Bttv": { "Title": "mine", "Active": true } },
        "Editors": ["mod_a"],
        "Protected": { "EditorFor": ["someone_else"] }
    });

    let (status, _) = send_json(
        &app,
        authed("POST", "/api/userconfig", Body::from(payload.to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send_json(&app, authed("GET", "/api/userconfig", Body::empty())).await;
    assert_eq!(body["Redemptions"]["Bttv"]["Title"], "mine");
    assert_eq!(body["Editors"], json!(["mod_a"]));
    assert_eq!(body["Protected"]["EditorFor"], json!([]));
}

#[tokio::test]
async fn userconfig_post_reports_failed_subscription() {
    let (app, repo) = test_app_with(Arc::new(SubscribeFails));
    let payload = json!({ "Redemptions": { "Bttv": { "Title": "b", "Active": true } } });

    let (status, body) = send_json(
        &app,
        authed("POST", "/api/userconfig", Body::from(payload.to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(
        body["warning"]
            .as_str()
            .unwrap()
            .contains("EVENTSUB_CALLBACK_URL")
    );
    assert!(repo.get_document(OWNER_ID).await.unwrap().is_some());

    let (_, body) = send_json(
        &app,
        authed("POST", "/api/userconfig", Body::from(payload.to_string())),
    )
    .await;
    assert!(body.get("warning").is_none());
}

#[tokio::test]
async fn userconfig_bad_payload_and_corruption_are_400() {
    let (app, repo) = test_app();

    let (status, _) = send_json(
        &app,
        authed("POST", "/api/userconfig", Body::from("{nope")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    repo.put_document(OWNER_ID, "[1,2,3]".into()).await.unwrap();
    let (status, body) = send_json(&app, authed("GET", "/api/userconfig", Body::empty())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("corrupted"));
}

#[tokio::test]
async fn userconfig_delete_removes_document() {
    let (app, repo) = test_app();
    repo.put_document(OWNER_ID, "{}".into()).await.unwrap();

    let (status, _) = send_json(&app, authed("DELETE", "/api/userconfig", Body::empty())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(repo.get_document(OWNER_ID).await.unwrap().is_none());
}

#[tokio::test]
async fn emotehistory_pages_and_removal() {
    let (app, repo) = test_app();
    for i in 0..25 {
        repo.append(
            OWNER_ID,
            RewardType::Seventv,
            &format!("emote{i:02}"),
            EmoteChangeType::Add,
        )
        .await
        .unwrap();
    }

    let (status, first) =
        send_json(&app, authed("GET", "/api/emotehistory?page=1", Body::empty())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first.as_array().unwrap().len(), 20);
    assert_eq!(first[0]["emoteId"], "emote24");

    let (_, second) = send_json(
        &app,
        authed("GET", "/api/emotehistory?page=2&added=true", Body::empty()),
    )
    .await;
    assert_eq!(second.as_array().unwrap().len(), 5);
    assert_eq!(second[0]["emoteId"], "emote04");

    let (status, removed) = send_json(
        &app,
        authed(
            "POST",
            "/api/emotehistory/remove",
            Body::from(json!({ "rewardType": "seventv", "emoteId": "emote24" }).to_string()),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["changeType"], "remove");

    let (_, removals) = send_json(
        &app,
        authed("GET", "/api/emotehistory?added=false", Body::empty()),
    )
    .await;
    assert_eq!(removals.as_array().unwrap().len(), 1);
    assert_eq!(
        repo.active_count(OWNER_ID, RewardType::Seventv).await.unwrap(),
        24
    );
}

#[tokio::test]
async fn reward_save_validates_options() {
    let (app, _) = test_app();

    let bad = json!({
        "rewardType": "Seventv",
        "rewardId": "reward-1",
        "title": "7TV",
        "enabled": true,
        "additionalOptions": { "slots": "many" }
    });
    let (status, _) = send_json(
        &app,
        authed("POST", "/api/reward", Body::from(bad.to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let good = json!({
        "rewardType": "Seventv",
        "rewardId": "reward-1",
        "title": "7TV",
        "enabled": true,
        "additionalOptions": { "slots": 2 }
    });
    let (status, saved) = send_json(
        &app,
        authed("POST", "/api/reward", Body::from(good.to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["ownerTwitchId"], OWNER_ID);

    let (_, list) = send_json(&app, authed("GET", "/api/reward", Body::empty())).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["rewardId"], "reward-1");
}

#[tokio::test]
async fn reward_delete_removes_configured_type() {
    let (app, _) = test_app();
    let reward = json!({
        "rewardType": "Bttv",
        "rewardId": "reward-b",
        "title": "BTTV",
        "enabled": true,
        "additionalOptions": { "slots": 1 }
    });
    send_json(
        &app,
        authed("POST", "/api/reward", Body::from(reward.to_string())),
    )
    .await;

    let (status, deleted) = send_json(
        &app,
        authed("DELETE", "/api/reward?rewardType=bttv", Body::empty()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["rewardId"], "reward-b");

    let (_, list) = send_json(&app, authed("GET", "/api/reward", Body::empty())).await;
    assert_eq!(list, json!([]));

    let (status, _) = send_json(
        &app,
        authed("DELETE", "/api/reward?rewardType=bttv", Body::empty()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(
        &app,
        authed("DELETE", "/api/reward?rewardType=ffz", Body::empty()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn eventsub_verification_echoes_challenge() {
    let (app, _) = test_app();
    let body = json!({
        "challenge": "pogchamp-kappa-360noscope-vohiyo",
        "subscription": {
            "id": "sub-1",
            "status": "webhook_callback_verification_pending",
            "type": EVENT_REWARD_REDEMPTION,
            "version": "1",
            "condition": { "broadcaster_user_id": OWNER_ID }
        }
    })
    .to_string();

    let (status, bytes) = send(&app, signed_webhook(MESSAGE_TYPE_VERIFICATION, &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"pogchamp-kappa-360noscope-vohiyo");
}

#[tokio::test]
async fn eventsub_rejects_bad_signature_and_missing_headers() {
    let (app, _) = test_app();

    let mut req = signed_webhook(MESSAGE_TYPE_VERIFICATION, "{}");
    req.headers_mut().insert(
        HEADER_MESSAGE_SIGNATURE,
        "sha256=0000000000000000000000000000000000000000000000000000000000000000"
            .parse()
            .unwrap(),
    );
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = Request::builder()
        .method("POST")
        .uri("/api/eventsub")
        .body(Body::from("{}"))
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn eventsub_notification_processes_redemption() {
    let (app, repo) = test_app();
    let reward = json!({
        "rewardType": "Seventv",
        "rewardId": "reward-1",
        "title": "7TV",
        "enabled": true,
        "additionalOptions": "{\"slots\":3}"
    });
    let (status, _) = send_json(
        &app,
        authed("POST", "/api/reward", Body::from(reward.to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let config = json!({
        "Redemptions": {
            "Bttv": { "Title": "Bttv emote", "Active": false },
            "Seventv": { "Title": "7TV", "Active": true }
        },
        "Editors": []
    });
    let (status, _) = send_json(
        &app,
        authed("POST", "/api/userconfig", Body::from(config.to_string())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let body = json!({
        "subscription": {
            "id": "sub-1",
            "status": "enabled",
            "type": EVENT_REWARD_REDEMPTION,
            "version": "1",
            "condition": { "broadcaster_user_id": OWNER_ID }
        },
        "event": {
            "id": "redemption-1",
            "broadcaster_user_id": OWNER_ID,
            "broadcaster_user_login": "streamer",
            "broadcaster_user_name": "Streamer",
            "user_id": "42",
            "user_login": "viewer",
            "user_name": "Viewer",
            "user_input": "https://7tv.app/emotes/60aed4fe423a803ccae373d3",
            "status": "unfulfilled",
            "reward": { "id": "reward-1", "title": "7TV", "cost": 100, "prompt": "" },
            "redeemed_at": "2024-01-01T00:00:00Z"
        }
    })
    .to_string();

    let (status, _) = send(&app, signed_webhook(MESSAGE_TYPE_NOTIFICATION, &body)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let mut active = 0;
    for _ in 0..100 {
        active = repo
            .active_count(OWNER_ID, RewardType::Seventv)
            .await
            .unwrap();
        if active == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(active, 1);
}

#[tokio::test]
async fn callback_without_code_is_400() {
    let (app, _) = test_app();
    let req = Request::builder()
        .uri("/api/callback")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "OAuth code missing");
}
