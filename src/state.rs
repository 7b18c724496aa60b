use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::clients::{
    AuthApi, Backend, HttpAuthClient, HttpNotificationsClient, HttpRecipesClient,
    HttpSearchClient, NotificationsApi, RecipesApi, SearchApi, SharedToken,
};
use crate::config::Config;
use crate::events::AppEvent;
use crate::services::{
    FeedService, PushService, SavedRecipesService, SessionService, SuggestService, ToastBus,
};
use crate::store::LocalStore;

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused across all clients for connection pooling.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent("Ladle/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Config,

    pub cache: Arc<LocalStore>,

    pub token: SharedToken,

    pub search: Arc<dyn SearchApi>,

    pub recipes: Arc<dyn RecipesApi>,

    pub notifications: Arc<dyn NotificationsApi>,

    pub auth: Arc<dyn AuthApi>,

    pub session: Arc<SessionService>,

    pub suggest: Arc<SuggestService>,

    pub saved: Arc<SavedRecipesService>,

    pub feed: Arc<FeedService>,

    pub toasts: ToastBus,

    pub push: Arc<PushService>,

    pub event_bus: broadcast::Sender<AppEvent>,
}

impl SharedState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size);
        Self::with_event_bus(config, event_bus)
    }

    pub fn with_event_bus(
        config: Config,
        event_bus: broadcast::Sender<AppEvent>,
    ) -> anyhow::Result<Self> {
        let cache = Arc::new(LocalStore::open(&config.cache.resolved_path()));
        let token = SharedToken::default();

        let http_client = build_shared_http_client(config.api.timeout_seconds)?;
        let backend = Backend::new(
            http_client,
            Some(config.api.base_url.clone()),
            Some(config.api.api_key.clone()),
            token.clone(),
        );

        let search: Arc<dyn SearchApi> = Arc::new(HttpSearchClient::new(backend.clone()));
        let recipes: Arc<dyn RecipesApi> = Arc::new(HttpRecipesClient::new(backend.clone()));
        let notifications: Arc<dyn NotificationsApi> =
            Arc::new(HttpNotificationsClient::new(backend.clone()));
        let auth: Arc<dyn AuthApi> = Arc::new(HttpAuthClient::new(backend));

        let toasts = ToastBus::new(
            event_bus.clone(),
            Duration::from_millis(config.notifications.toast_duration_ms),
        );

        let saved = Arc::new(SavedRecipesService::new(
            recipes.clone(),
            cache.clone(),
            event_bus.clone(),
        ));

        let session = Arc::new(SessionService::new(
            auth.clone(),
            cache.clone(),
            token.clone(),
            saved.clone(),
            event_bus.clone(),
        ));

        let suggest = Arc::new(SuggestService::new(
            search.clone(),
            event_bus.clone(),
            &config.search,
        ));

        let feed = Arc::new(FeedService::new(
            notifications.clone(),
            toasts.clone(),
            event_bus.clone(),
            config.notifications.page_size,
            Duration::from_secs(config.notifications.unread_poll_seconds),
        ));

        let push = Arc::new(PushService::new(
            toasts.clone(),
            feed.clone(),
            cache.clone(),
        ));

        Ok(Self {
            config,
            cache,
            token,
            search,
            recipes,
            notifications,
            auth,
            session,
            suggest,
            saved,
            feed,
            toasts,
            push,
            event_bus,
        })
    }
}
