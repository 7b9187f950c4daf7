//! Application State - Stato globale dell'applicazione
//!
//! Contiene le directory in memoria, il feed delle modifiche, il provider di
//! geocoding e la configurazione dei token condivisi da route e middleware.

use crate::core::Config;
use crate::geocoding::Geocoder;
use crate::repositories::{CarpoolDirectory, UserRepository};
use crate::ws::CarpoolFeed;
use std::sync::Arc;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Repository per la gestione degli utenti
    pub user: UserRepository,

    /// Directory dei carpool con le relative membership
    pub carpools: CarpoolDirectory,

    /// Canali broadcast per chi osserva un carpool, condivisi con `carpools`
    pub feed: Arc<CarpoolFeed>,

    /// Provider di ricerca delle destinazioni
    pub geocoder: Arc<dyn Geocoder>,

    /// Secret key per JWT token
    pub jwt_secret: String,

    /// Durata dei token emessi al login
    pub jwt_ttl_hours: i64,
}

impl AppState {
    /// Crea una nuova istanza di AppState con directory vuote.
    ///
    /// # Arguments
    /// * `geocoder` - Provider usato da `/search`
    /// * `jwt_secret` - Chiave segreta per la firma dei token JWT
    /// * `jwt_ttl_hours` - Validità dei token in ore
    pub fn new(geocoder: Arc<dyn Geocoder>, jwt_secret: String, jwt_ttl_hours: i64) -> Self {
        let feed = Arc::new(CarpoolFeed::new());
        Self {
            user: UserRepository::new(),
            carpools: CarpoolDirectory::with_feed(feed.clone()),
            feed,
            geocoder,
            jwt_secret,
            jwt_ttl_hours,
        }
    }

    pub fn from_config(config: &Config, geocoder: Arc<dyn Geocoder>) -> Self {
        Self::new(geocoder, config.jwt_secret.clone(), config.jwt_ttl_hours)
    }
}
