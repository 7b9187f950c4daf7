//! Server library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod entities;
pub mod geocoding;
pub mod repositories;
pub mod services;
pub mod ws;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Router, middleware,
    routing::{any, get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/", get(root))
        .nest("/auth", configure_auth_routes())
        .nest("/users", configure_user_routes(state.clone()))
        .nest("/carpools", configure_carpool_routes(state.clone()))
        .route(
            "/search",
            get(search_destinations).layer(middleware::from_fn_with_state(
                state.clone(),
                authentication_middleware,
            )),
        )
        .with_state(state)
}

/// Router con CORS, usato dal binario
pub fn create_router_with_cors(state: Arc<AppState>, allow_any_origin: bool) -> Router {
    let cors = if allow_any_origin {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };
    create_router(state).layer(cors)
}

/// Configura le routes di autenticazione (login, register)
fn configure_auth_routes() -> Router<Arc<AppState>> {
    use crate::services::*;
    Router::new()
        .route("/login", post(login_user))
        .route("/register", post(register_user))
}

/// Configura le routes per la gestione degli utenti
fn configure_user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/me", get(get_me).delete(delete_my_account))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes per la gestione dei carpool e delle membership
fn configure_carpool_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;
    use crate::ws::watch_carpool;

    // Tutte le rotte richiedono autenticazione; i controlli da owner
    // vengono fatti negli handler perché dipendono dal carpool
    Router::new()
        .route("/", get(list_carpools).post(create_carpool))
        .route("/discover", get(discover_carpools))
        .route(
            "/{carpool_id}",
            get(get_carpool).patch(update_carpool).delete(delete_carpool),
        )
        .route("/{carpool_id}/join", post(join_carpool))
        .route("/{carpool_id}/cancel", post(cancel_request))
        .route("/{carpool_id}/leave", post(leave_carpool))
        .route("/{carpool_id}/requests", get(list_requests))
        .route(
            "/{carpool_id}/requests/{user_id}/{action}",
            post(respond_to_request),
        )
        .route("/{carpool_id}/watch", any(watch_carpool))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}
