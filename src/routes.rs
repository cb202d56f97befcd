use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::session_middleware;
use crate::state::AppState;

/// The full application router
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);
    let body_limit = RequestBodyLimitLayer::new(state.config.api.max_request_size_bytes);

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Scoped API
        .merge(auth_routes())
        .merge(describe_routes())
        .merge(data_routes())
        .merge(stats_routes())
        // Global middleware
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use protected::auth;

    Router::new().route("/api/auth/whoami", get(auth::whoami_get))
}

fn describe_routes() -> Router<AppState> {
    use protected::describe;

    Router::new()
        .route("/api/describe", get(describe::resource_list))
        .route("/api/describe/:resource", get(describe::resource_get))
}

fn data_routes() -> Router<AppState> {
    use protected::data;

    Router::new()
        // Collection
        .route(
            "/api/data/:resource",
            get(data::collection_get).post(data::collection_post),
        )
        // Single record
        .route(
            "/api/data/:resource/:id",
            get(data::record_get)
                .put(data::record_put)
                .patch(data::record_patch)
                .delete(data::record_delete),
        )
}

fn stats_routes() -> Router<AppState> {
    Router::new().route("/api/stats/:resource", get(protected::stats::get))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
