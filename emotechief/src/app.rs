use std::sync::Arc;

use emote_db::Database;
use twitch_client::auth::TwitchAuth;

use crate::collaborators::{
    BttvClient, EmoteProviders, HelixCollaborator, SevenTvClient, TokenValidator,
};
use crate::config::AppConfig;
use crate::emotechief::EmoteChief;
use crate::repository::{EmoteLedger, RewardRepository, SqliteRepository};
use crate::user_config::ConfigStore;

/// Application shared state accessible from axum handlers and background tasks.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    config: AppConfig,
    repo: SqliteRepository,
    auth: Arc<TwitchAuth>,
    chief: EmoteChief,
    config_store: ConfigStore,
    ledger: Arc<dyn EmoteLedger>,
    rewards: Arc<dyn RewardRepository>,
    validator: Arc<dyn TokenValidator>,
}

/// Injectable parts of the state, swapped for fakes in tests.
pub struct Services {
    pub chief: EmoteChief,
    pub config_store: ConfigStore,
    pub validator: Arc<dyn TokenValidator>,
}

impl SharedState {
    /// Wire the production collaborators around an opened database.
    pub fn new(db: Database, config: AppConfig) -> Self {
        let repo = SqliteRepository::new(db);
        let auth = Arc::new(TwitchAuth::new(
            config.client_id.clone(),
            config.client_secret.clone(),
            config.redirect_uri.clone(),
        ));
        let helix = Arc::new(HelixCollaborator::new(
            auth.clone(),
            repo.clone(),
            config.eventsub_callback_url.clone(),
            config.eventsub_secret.clone(),
            config.bot_user_id.clone(),
        ));
        let providers = EmoteProviders {
            bttv: Arc::new(BttvClient::new(config.bttv_token.clone())),
            seventv: Arc::new(SevenTvClient::new(config.seventv_token.clone())),
        };
        let timeout = config.operation_timeout();

        let services = Services {
            chief: EmoteChief::new(
                Arc::new(repo.clone()),
                Arc::new(repo.clone()),
                Arc::new(repo.clone()),
                providers,
                helix.clone(),
                helix.clone(),
                timeout,
            ),
            config_store: ConfigStore::new(Arc::new(repo.clone()), helix.clone(), timeout),
            validator: helix,
        };
        Self::with_services(config, repo, auth, services)
    }

    pub fn with_services(
        config: AppConfig,
        repo: SqliteRepository,
        auth: Arc<TwitchAuth>,
        services: Services,
    ) -> Self {
        Self {
            inner: Arc::new(SharedStateInner {
                config,
                ledger: Arc::new(repo.clone()),
                rewards: Arc::new(repo.clone()),
                repo,
                auth,
                chief: services.chief,
                config_store: services.config_store,
                validator: services.validator,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn server_port(&self) -> u16 {
        self.inner.config.server_port
    }

    pub fn repo(&self) -> &SqliteRepository {
        &self.inner.repo
    }

    pub fn auth(&self) -> &TwitchAuth {
        &self.inner.auth
    }

    pub fn chief(&self) -> &EmoteChief {
        &self.inner.chief
    }

    pub fn config_store(&self) -> &ConfigStore {
        &self.inner.config_store
    }

    pub fn ledger(&self) -> &Arc<dyn EmoteLedger> {
        &self.inner.ledger
    }

    pub fn rewards(&self) -> &Arc<dyn RewardRepository> {
        &self.inner.rewards
    }

    pub fn validator(&self) -> &Arc<dyn TokenValidator> {
        &self.inner.validator
    }
}
