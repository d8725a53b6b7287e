use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::domain::events::SolvedEvent;
use crate::services::AcceptanceService;
use crate::state::SharedState;

mod answers;
pub mod auth;
mod categories;
mod error;
pub mod events;
mod observability;
mod posts;
mod reports;
mod search;
mod topics;
mod types;
mod users;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    #[must_use]
    pub fn event_bus(&self) -> &broadcast::Sender<SolvedEvent> {
        &self.shared.event_bus
    }

    #[must_use]
    pub fn acceptance(&self) -> &Arc<dyn AcceptanceService> {
        &self.shared.acceptance
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().read().await.server.cors_allowed_origins.clone();

    let api_router = create_api_router(state.clone()).with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_api_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/solution/accept", post(answers::accept))
        .route("/solution/unaccept", post(answers::unaccept))
        .route("/solution/by_user/{username}", get(users::solved_posts))
        .route("/topics", get(topics::list_topics))
        .route("/topics/{id}", get(topics::get_topic))
        .route("/topics/{id}/category", put(topics::change_category))
        .route(
            "/categories/{id}/solved_settings",
            put(categories::update_solved_settings),
        )
        .route("/posts/{id}", delete(posts::delete_post))
        .route(
            "/reports/accepted_solutions",
            get(reports::accepted_solutions),
        )
        .route("/users/{username}/summary", get(users::summary))
        .route("/search", get(search::search_posts))
        .route("/events", get(events::sse_handler))
        .route("/metrics", get(observability::get_metrics))
        .route("/health", get(observability::health))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
