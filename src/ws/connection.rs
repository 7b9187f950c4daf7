//! WebSocket Connection Management - Gestione della connessione di un osservatore

use crate::entities::{CarpoolId, UserId};
use crate::ws::feed::{CarpoolChanged, ChangeKind};
use crate::ws::PING_INTERVAL_SECONDS;
use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::Receiver;
use tokio::time::{Duration, interval};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{error, info, instrument, warn};

/// Inoltra al client le notifiche del carpool finché uno dei due lati chiude.
///
/// Alla connessione viene inviata la revisione corrente (`subscribed`), così
/// il client sa subito se la sua proiezione è aggiornata.
#[instrument(skip(ws, rx), fields(carpool_id = %carpool_id, user_id = %user_id))]
pub async fn handle_socket(
    ws: WebSocket,
    carpool_id: CarpoolId,
    current_revision: u64,
    rx: Receiver<Arc<CarpoolChanged>>,
    user_id: UserId,
) {
    info!("Watcher connected");

    let (mut ws_tx, mut ws_rx) = ws.split();
    let mut changes = BroadcastStream::new(rx);

    let hello = CarpoolChanged {
        carpool_id,
        revision: current_revision,
        kind: ChangeKind::Subscribed,
    };
    if send_change(&mut ws_tx, &hello).await.is_err() {
        return;
    }

    let mut ping = interval(Duration::from_secs(PING_INTERVAL_SECONDS));
    ping.tick().await; // Consuma primo tick immediato

    'external: loop {
        tokio::select! {
            change = changes.next() => {
                match change {
                    Some(Ok(event)) => {
                        if send_change(&mut ws_tx, &event).await.is_err() {
                            break 'external;
                        }
                        if event.kind == ChangeKind::Deleted {
                            info!("Carpool deleted, closing watcher");
                            break 'external;
                        }
                    }
                    Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                        // la prossima notifica porta comunque l'ultima revisione
                        warn!(skipped, "Watcher lagging behind, notifications skipped");
                    }
                    None => {
                        info!("Change feed closed");
                        break 'external;
                    }
                }
            }

            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Watcher closed the connection");
                        break 'external;
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error: {:?}", e);
                        break 'external;
                    }
                    // il canale è in sola lettura, il resto viene ignorato
                    Some(Ok(_)) => {}
                }
            }

            _ = ping.tick() => {
                if ws_tx.send(Message::Ping(Default::default())).await.is_err() {
                    break 'external;
                }
            }
        }
    }

    let _ = ws_tx.close().await;
    info!("Watcher disconnected");
}

async fn send_change(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    event: &CarpoolChanged,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).map_err(|e| {
        error!("Failed to serialize change: {:?}", e);
        axum::Error::new(e)
    })?;
    ws_tx
        .send(Message::Text(Utf8Bytes::from(json)))
        .await
        .map_err(|e| {
            warn!("Failed to send change through WebSocket: {:?}", e);
            e
        })
}
