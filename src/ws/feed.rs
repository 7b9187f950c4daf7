use crate::entities::CarpoolId;
use crate::ws::BROADCAST_CHANNEL_CAPACITY;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::{Receiver, Sender};
use tracing::{debug, info, instrument};

/// Tipo di modifica avvenuta sul carpool
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Primo messaggio alla connessione, porta la revisione corrente
    Subscribed,
    Membership,
    Edited,
    Deleted,
}

/// Notifica inviata a chi osserva un carpool: basta la revisione per capire
/// se la propria proiezione è vecchia
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CarpoolChanged {
    pub carpool_id: CarpoolId,
    pub revision: u64,
    pub kind: ChangeKind,
}

pub struct CarpoolFeed {
    /// Attribute to retrieve the tx head of a broadcast channel by carpool id
    channels: DashMap<CarpoolId, Sender<Arc<CarpoolChanged>>>,
}

impl Default for CarpoolFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl CarpoolFeed {
    pub fn new() -> Self {
        CarpoolFeed {
            channels: DashMap::new(),
        }
    }

    #[instrument(skip(self), fields(carpool_id = %carpool_id))]
    pub fn subscribe(&self, carpool_id: CarpoolId) -> Receiver<Arc<CarpoolChanged>> {
        // entry() evita che due subscribe concorrenti creino due canali diversi
        self.channels
            .entry(carpool_id)
            .or_insert_with(|| {
                info!("Creating new broadcast channel for carpool");
                broadcast::channel::<Arc<CarpoolChanged>>(BROADCAST_CHANNEL_CAPACITY).0
            })
            .subscribe()
    }

    /// Pubblica la notifica. Ritorna il numero di osservatori raggiunti;
    /// se non c'è nessuno in ascolto il canale viene rimosso.
    #[instrument(skip(self, event), fields(carpool_id = %event.carpool_id, revision = event.revision))]
    pub fn publish(&self, event: CarpoolChanged) -> usize {
        let carpool_id = event.carpool_id;
        let deleted = event.kind == ChangeKind::Deleted;

        // il Ref dello shard va rilasciato prima di remove_if
        let delivered = self
            .channels
            .get(&carpool_id)
            .map(|channel| channel.send(Arc::new(event)).unwrap_or(0))
            .unwrap_or(0);
        debug!(receivers = delivered, "Change broadcast to watchers");

        // controllo e rimozione sotto lo stesso lock: un subscribe appena
        // arrivato tiene in vita il canale
        self.channels
            .remove_if(&carpool_id, |_, tx| deleted || tx.receiver_count() == 0);
        delivered
    }

    /// Rimuove il canale se nessuno lo sta più ascoltando
    pub fn release(&self, carpool_id: CarpoolId) {
        if self
            .channels
            .remove_if(&carpool_id, |_, tx| tx.receiver_count() == 0)
            .is_some()
        {
            debug!(carpool_id = %carpool_id, "Dropped idle broadcast channel");
        }
    }

    pub fn watched_count(&self) -> usize {
        self.channels.len()
    }
}
