//! CarpoolDirectory - Collezione in memoria dei carpool con accesso concorrente
//!
//! Ogni carpool vive in uno slot con:
//! - un mutex asincrono che serializza tutte le mutazioni dell'entità
//! - uno snapshot immutabile (`Arc<Carpool>`) pubblicato dopo ogni mutazione riuscita
//!
//! Le mutazioni lavorano su una copia privata e la pubblicano in un colpo solo:
//! o cambia tutto (stato + revisione) o non cambia niente. La notifica sul
//! feed parte mentre il mutex è ancora preso, quindi gli osservatori vedono
//! le revisioni di un carpool sempre in ordine crescente.
//! Le operazioni sull'intera directory (create, list_for_user, search) leggono
//! solo gli snapshot e non attendono mai i mutex delle singole entità.

use super::DirectoryError;
use crate::entities::{
    Carpool, CarpoolChanges, CarpoolId, Destination, MembershipState, Schedule, Transition, UserId,
};
use crate::ws::{CarpoolChanged, CarpoolFeed, ChangeKind};
use dashmap::{DashMap, DashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Esito di `apply_transition`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionResult {
    /// Nuovo stato di membership dell'utente
    pub state: MembershipState,
    /// Revisione del carpool dopo la transizione
    pub revision: u64,
    /// Falso per le richieste ripetute (no-op)
    pub changed: bool,
}

/// Cosa è stato toccato dalla cancellazione di un account
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PurgeReport {
    /// Carpool di proprietà dell'utente, eliminati, con l'ultima revisione
    pub removed: Vec<(CarpoolId, u64)>,
    /// Carpool da cui l'utente è stato tolto, con la nuova revisione
    pub updated: Vec<(CarpoolId, u64)>,
}

enum Lifecycle {
    Live,
    Retired,
}

struct CarpoolSlot {
    writer: Mutex<Lifecycle>,
    snapshot: RwLock<Arc<Carpool>>,
}

impl CarpoolSlot {
    fn new(carpool: Carpool) -> Self {
        Self {
            writer: Mutex::new(Lifecycle::Live),
            snapshot: RwLock::new(Arc::new(carpool)),
        }
    }

    fn current(&self) -> Arc<Carpool> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn publish(&self, carpool: Arc<Carpool>) {
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = carpool;
    }
}

pub struct CarpoolDirectory {
    slots: DashMap<CarpoolId, Arc<CarpoolSlot>>,
    /// Account cancellati: non possono più creare carpool né cambiare membership
    retired_users: DashSet<UserId>,
    feed: Arc<CarpoolFeed>,
    next_id: AtomicU64,
}

impl Default for CarpoolDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl CarpoolDirectory {
    pub fn new() -> Self {
        Self::with_feed(Arc::new(CarpoolFeed::new()))
    }

    /// Directory che annuncia le proprie modifiche sul feed indicato
    pub fn with_feed(feed: Arc<CarpoolFeed>) -> Self {
        Self {
            slots: DashMap::new(),
            retired_users: DashSet::new(),
            feed,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn feed(&self) -> &Arc<CarpoolFeed> {
        &self.feed
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot(&self, id: CarpoolId) -> Result<Arc<CarpoolSlot>, DirectoryError> {
        // clono l'Arc per rilasciare subito il lock dello shard
        self.slots
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(DirectoryError::NotFound("carpool"))
    }

    fn snapshots(&self) -> Vec<Arc<Carpool>> {
        let mut carpools: Vec<Arc<Carpool>> = self
            .slots
            .iter()
            .map(|entry| entry.value().current())
            .collect();
        carpools.sort_by_key(|c| c.id);
        carpools
    }

    /// Va chiamata con il writer dello slot ancora preso
    fn announce(&self, carpool: &Carpool, kind: ChangeKind) {
        let delivered = self.feed.publish(CarpoolChanged {
            carpool_id: carpool.id,
            revision: carpool.revision(),
            kind,
        });
        debug!(carpool_id = %carpool.id, ?kind, delivered, "Watchers notified");
    }

    fn ensure_active(&self, user: UserId) -> Result<(), DirectoryError> {
        if self.retired_users.contains(&user) {
            return Err(DirectoryError::NotFound("user"));
        }
        Ok(())
    }

    /// Crea un carpool. Fallisce con `Validation` se il titolo è vuoto o la
    /// destinazione non è impostata, con `NotFound` se l'owner è stato cancellato.
    #[instrument(skip(self, title, destination, schedule), fields(owner = %owner))]
    pub fn create(
        &self,
        owner: UserId,
        title: &str,
        destination: Option<Destination>,
        schedule: Schedule,
    ) -> Result<Arc<Carpool>, DirectoryError> {
        let id = CarpoolId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let carpool = Carpool::new(id, owner, title, destination, schedule).map_err(|e| {
            warn!("Rejected carpool creation: {}", e);
            e
        })?;
        let slot = Arc::new(CarpoolSlot::new(carpool));
        let snapshot = slot.current();
        self.slots.insert(id, slot);

        // controllo dopo l'inserimento: o lo vede purge_user, o vediamo noi il tombstone
        if let Err(e) = self.ensure_active(owner) {
            self.slots.remove(&id);
            warn!("Owner was deleted while publishing the carpool");
            return Err(e);
        }
        info!(carpool_id = %id, "Carpool created");
        Ok(snapshot)
    }

    pub fn get(&self, id: CarpoolId) -> Result<Arc<Carpool>, DirectoryError> {
        Ok(self.slot(id)?.current())
    }

    /// Carpool in cui l'utente è owner o membro, ordinati per id
    pub fn list_for_user(&self, user: UserId) -> Vec<Arc<Carpool>> {
        self.snapshots()
            .into_iter()
            .filter(|c| c.is_participant(user))
            .collect()
    }

    /// Ricerca case-insensitive su titolo ed etichetta della destinazione
    pub fn search(&self, query: &str) -> Vec<Arc<Carpool>> {
        let needle = query.trim().to_lowercase();
        self.snapshots()
            .into_iter()
            .filter(|c| {
                needle.is_empty()
                    || c.title.to_lowercase().contains(&needle)
                    || c.destination.label.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Esegue `f` su una copia del carpool tenendo il lock dell'entità e
    /// pubblica il risultato solo se `f` ha successo e la revisione è cambiata.
    async fn mutate<T>(
        &self,
        id: CarpoolId,
        kind: ChangeKind,
        f: impl FnOnce(&mut Carpool) -> Result<T, DirectoryError>,
    ) -> Result<(T, Arc<Carpool>), DirectoryError> {
        let slot = self.slot(id)?;
        let lifecycle = slot.writer.lock().await;
        if matches!(*lifecycle, Lifecycle::Retired) {
            return Err(DirectoryError::NotFound("carpool"));
        }

        let current = slot.current();
        let mut draft = Carpool::clone(&current);
        let value = f(&mut draft)?;

        if draft.revision() == current.revision() {
            return Ok((value, current));
        }
        let published = Arc::new(draft);
        slot.publish(published.clone());
        self.announce(&published, kind);
        Ok((value, published))
    }

    /// Applica una transizione di membership per `user` sul carpool indicato
    #[instrument(skip(self), fields(carpool_id = %id, user_id = %user, transition = %transition))]
    pub async fn apply_transition(
        &self,
        id: CarpoolId,
        user: UserId,
        transition: Transition,
    ) -> Result<TransitionResult, DirectoryError> {
        let (step, carpool) = self
            .mutate(id, ChangeKind::Membership, |carpool| {
                self.ensure_active(user)?;
                carpool.apply_transition(user, transition)
            })
            .await
            .map_err(|e| {
                warn!("Transition rejected: {}", e);
                e
            })?;

        let result = TransitionResult {
            state: step.state(),
            revision: carpool.revision(),
            changed: step.is_change(),
        };
        if result.changed {
            info!(state = %result.state, revision = result.revision, "Membership changed");
        } else {
            debug!(state = %result.state, "Repeated transition, nothing to do");
        }
        Ok(result)
    }

    /// Modifiche dell'owner (titolo, destinazione, orario)
    #[instrument(skip(self, changes), fields(carpool_id = %id))]
    pub async fn update(
        &self,
        id: CarpoolId,
        changes: CarpoolChanges,
    ) -> Result<Arc<Carpool>, DirectoryError> {
        let (changed, carpool) = self
            .mutate(id, ChangeKind::Edited, |carpool| carpool.edit(changes))
            .await?;
        if changed {
            info!(revision = carpool.revision(), "Carpool updated");
        }
        Ok(carpool)
    }

    /// Elimina il carpool. Una transizione concorrente che arriva dopo vede `NotFound`.
    #[instrument(skip(self), fields(carpool_id = %id))]
    pub async fn remove(&self, id: CarpoolId) -> Result<Arc<Carpool>, DirectoryError> {
        let slot = self.slot(id)?;
        let mut lifecycle = slot.writer.lock().await;
        if matches!(*lifecycle, Lifecycle::Retired) {
            return Err(DirectoryError::NotFound("carpool"));
        }
        *lifecycle = Lifecycle::Retired;
        self.slots.remove(&id);

        let removed = slot.current();
        self.announce(&removed, ChangeKind::Deleted);
        info!("Carpool removed");
        Ok(removed)
    }

    /// Cascata della cancellazione di un account: elimina i carpool di cui
    /// l'utente è owner e lo toglie da membri e richieste pendenti degli altri.
    /// Da qui in poi `create` e `apply_transition` rifiutano l'utente.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn purge_user(&self, user: UserId) -> PurgeReport {
        self.retired_users.insert(user);
        let mut report = PurgeReport::default();

        for carpool in self.snapshots() {
            if carpool.is_owner(user) {
                if let Ok(removed) = self.remove(carpool.id).await {
                    report.removed.push((removed.id, removed.revision()));
                }
                continue;
            }
            // lo snapshot può non mostrare ancora una join in corso: si passa
            // comunque dal lock dell'entità
            match self
                .mutate(carpool.id, ChangeKind::Membership, |c| Ok(c.drop_user(user)))
                .await
            {
                Ok((true, updated)) => report.updated.push((updated.id, updated.revision())),
                Ok((false, _)) => {}
                Err(e) => debug!(carpool_id = %carpool.id, "Skipping carpool during purge: {}", e),
            }
        }

        info!(
            removed = report.removed.len(),
            updated = report.updated.len(),
            "User purged from carpool directory"
        );
        report
    }
}
