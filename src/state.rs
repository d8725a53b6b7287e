use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::config::Config;
use crate::db::Store;
use crate::domain::events::SolvedEvent;
use crate::services::{
    AcceptanceService, AutoCloseService, CategoryAllowlistCache, CategorySaveObserver,
    CategoryService, PermissionPolicy, QueryFilters, RateLimiter, ReportService,
    SeaOrmAcceptanceService, TopicLock, UnresolvedReminderService, WebhookService,
    build_topic_lock,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub event_bus: broadcast::Sender<SolvedEvent>,

    pub allowlist: Arc<CategoryAllowlistCache>,

    pub policy: Arc<PermissionPolicy>,

    pub topic_lock: Arc<dyn TopicLock>,

    pub rate_limiter: Arc<RateLimiter>,

    pub query_filters: Arc<QueryFilters>,

    pub webhooks: Arc<WebhookService>,

    pub acceptance: Arc<dyn AcceptanceService>,

    pub categories: Arc<CategoryService>,

    pub reports: Arc<ReportService>,

    pub auto_close: Arc<AutoCloseService>,

    pub reminders: Arc<UnresolvedReminderService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size.max(1));
        Self::init_with_event_bus(config, event_bus).await
    }

    pub async fn with_event_bus(
        config: Config,
        event_bus: broadcast::Sender<SolvedEvent>,
    ) -> anyhow::Result<Self> {
        Self::init_with_event_bus(config, event_bus).await
    }

    async fn init_with_event_bus(
        config: Config,
        event_bus: broadcast::Sender<SolvedEvent>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let topic_lock = build_topic_lock(&config.lock, store.conn.clone());
        let rate_limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        let config = Arc::new(RwLock::new(config));

        let allowlist = Arc::new(CategoryAllowlistCache::new(store.conn.clone()));
        let policy = Arc::new(PermissionPolicy::new(store.clone(), allowlist.clone()));
        let query_filters = Arc::new(QueryFilters::new(store.conn.clone(), allowlist.clone()));
        let webhooks = Arc::new(WebhookService::new(store.conn.clone()));

        let acceptance = Arc::new(SeaOrmAcceptanceService::new(
            store.clone(),
            config.clone(),
            topic_lock.clone(),
            webhooks.clone(),
            event_bus.clone(),
        )) as Arc<dyn AcceptanceService + Send + Sync + 'static>;

        let categories = Arc::new(CategoryService::new(
            store.clone(),
            policy.clone(),
            event_bus.clone(),
        ));
        categories.subscribe(allowlist.clone() as Arc<dyn CategorySaveObserver>);

        let reports = Arc::new(ReportService::new(store.clone()));

        let auto_close = Arc::new(AutoCloseService::new(
            store.clone(),
            topic_lock.clone(),
            event_bus.clone(),
        ));

        let reminders = Arc::new(UnresolvedReminderService::new(
            store.clone(),
            config.clone(),
            query_filters.clone(),
        ));

        Ok(Self {
            config,
            store,
            event_bus,
            allowlist,
            policy,
            topic_lock,
            rate_limiter,
            query_filters,
            webhooks,
            acceptance,
            categories,
            reports,
            auto_close,
            reminders,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
