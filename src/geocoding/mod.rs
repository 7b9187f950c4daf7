//! Geocoding Module - Porta verso il provider di ricerca destinazioni
//!
//! Il provider risolve un testo libero in un singolo valore `SearchOutcome`:
//! suggerimenti parziali, un risultato definitivo oppure un errore.
//! Il core memorizza la destinazione scelta senza validarne le coordinate.

pub mod gazetteer;

pub use gazetteer::{Gazetteer, GazetteerError};

use crate::entities::Destination;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Voce proposta mentre l'utente sta ancora scrivendo
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub label: String,
    pub destination: Destination,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SearchOutcome {
    Suggestions(Vec<Suggestion>),
    Result(Destination),
    Error(String),
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str) -> SearchOutcome;
}
