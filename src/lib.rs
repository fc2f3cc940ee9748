//! Drinks API library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, Config, auth, config};

use axum::http::{Method, header};
use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Crea il router principale dell'applicazione
///
/// Ogni route protetta dichiara il permesso che richiede tramite un
/// `PermissionGuard`; le route pubbliche non passano dal middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    use crate::core::{PermissionGuard, authorization_middleware, permissions};
    use services::*;

    Router::new()
        .route(
            "/drinks",
            get(list_drinks).merge(post(create_drink).route_layer(
                middleware::from_fn_with_state(
                    PermissionGuard::new(state.clone(), permissions::POST_DRINKS),
                    authorization_middleware,
                ),
            )),
        )
        .route(
            "/drinks-detail",
            get(list_drinks_detail).route_layer(middleware::from_fn_with_state(
                PermissionGuard::new(state.clone(), permissions::GET_DRINKS_DETAIL),
                authorization_middleware,
            )),
        )
        .route(
            "/drinks/{drink_id}",
            patch(update_drink)
                .route_layer(middleware::from_fn_with_state(
                    PermissionGuard::new(state.clone(), permissions::PATCH_DRINKS),
                    authorization_middleware,
                ))
                .merge(delete(delete_drink).route_layer(middleware::from_fn_with_state(
                    PermissionGuard::new(state.clone(), permissions::DELETE_DRINKS),
                    authorization_middleware,
                ))),
        )
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(configure_cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS aperto a tutte le origini, come si aspetta il frontend
fn configure_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}
