//! Query DTOs - Data Transfer Objects per query di ricerca

use serde::{Deserialize, Serialize};

/// Query parameters per le ricerche testuali (`/carpools/discover`, `/search`)
#[derive(Serialize, Deserialize, Debug)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

/// Query parameters per la lettura di un carpool
#[derive(Serialize, Deserialize, Debug)]
pub struct CarpoolQuery {
    /// Revisione già in possesso del client, se coincide si risponde 304
    #[serde(default)]
    pub known_revision: Option<u64>,
}
