use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment};
use crate::database::DocumentStore;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::services::{AccountService, TicketService};

/// Shared handles for request handlers. Holds no per-request state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub tickets: TicketService,
    pub accounts: AccountService,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            tickets: TicketService::new(store.clone()),
            accounts: AccountService::new(store.clone()),
            store,
        }
    }
}

/// Full router with middleware, ready to serve
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = routes(state).layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(config));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

/// Route table without global layers
pub fn routes(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(user_public_routes())
        // Protected (JWT required)
        .merge(protected_routes())
        .with_state(state)
}

fn user_public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", post(public::users::register))
        .route("/api/users/login", post(public::users::login))
}

fn protected_routes() -> Router<AppState> {
    use protected::tickets;

    Router::new()
        .route("/api/users/me", get(protected::users::me))
        .route("/api/tickets", get(tickets::list).post(tickets::create))
        .route(
            "/api/tickets/:id",
            get(tickets::fetch).put(tickets::update).delete(tickets::delete),
        )
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if matches!(config.environment, Environment::Development) {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
