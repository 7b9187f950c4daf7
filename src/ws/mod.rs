//! WebSocket Module - Feed delle modifiche ai carpool
//!
//! Dopo ogni mutazione riuscita la directory pubblica `{carpool_id, revision, kind}`
//! su un canale broadcast per carpool. Il layer di sincronizzazione esterno e i
//! client osservano il feed via WebSocket e ricaricano il carpool solo quando
//! la revisione cambia. Include:
//! - Mappa concorrente dei canali broadcast per carpool
//! - Gestione upgrade HTTP -> WebSocket
//! - Gestione della singola connessione (split sender/receiver)

pub mod connection;
pub mod feed;

// Re-exports pubblici
pub use connection::handle_socket;
pub use feed::{CarpoolChanged, CarpoolFeed, ChangeKind};

use crate::core::{AppError, AppState};
use crate::entities::{CarpoolId, User};
use axum::{
    Extension,
    extract::{Path, State, ws::WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Capacità di ogni canale broadcast; chi resta indietro perde notifiche
/// intermedie ma riceve comunque l'ultima revisione
pub const BROADCAST_CHANNEL_CAPACITY: usize = 64;

/// Intervallo dei ping verso il client per tenere viva la connessione
pub const PING_INTERVAL_SECONDS: u64 = 30;

/// Entry point per osservare un carpool
/// Operazioni:
/// 1. Estrarre user_id dall'autenticazione JWT
/// 2. Sottoscriversi al feed PRIMA dell'upgrade
/// 3. Leggere la revisione corrente (NOT_FOUND se il carpool non esiste, il canale viene rilasciato)
/// 4. Eseguire upgrade HTTP -> WebSocket e passare la connessione ad handle_socket
#[instrument(skip(ws, state, current_user), fields(carpool_id = %carpool_id, user_id = %current_user.user_id))]
pub async fn watch_carpool(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(carpool_id): Path<CarpoolId>,
    Extension(current_user): Extension<User>, // ottenuto dall'autenticazione JWT
) -> Result<Response, AppError> {
    let rx = state.feed.subscribe(carpool_id);
    // letta dopo la sottoscrizione: ogni modifica successiva arriva dal feed
    let revision = match state.carpools.get(carpool_id) {
        Ok(carpool) => carpool.revision(),
        Err(e) => {
            drop(rx);
            state.feed.release(carpool_id);
            warn!("Cannot watch carpool: {}", e);
            return Err(e.into());
        }
    };
    let user_id = current_user.user_id;

    info!(revision, "Upgrading watcher connection");
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, carpool_id, revision, rx, user_id)))
}
