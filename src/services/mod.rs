//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati per una migliore manutenibilità.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità.

pub mod auth;
pub mod carpool;
pub mod membership;
pub mod search;
pub mod user;

// Re-exports per facilitare l'import
pub use auth::{login_user, register_user};
pub use carpool::{
    create_carpool, delete_carpool, discover_carpools, get_carpool, list_carpools, update_carpool,
};
pub use membership::{
    cancel_request, join_carpool, leave_carpool, list_requests, respond_to_request,
};
pub use search::search_destinations;
pub use user::{delete_my_account, get_me};

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Root endpoint - health check
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
