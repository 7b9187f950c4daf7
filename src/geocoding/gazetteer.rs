//! Gazetteer - Geocoder in memoria per sviluppo e test
//!
//! Tiene un elenco di destinazioni note (caricabile da un file JSON) e
//! risponde alle ricerche senza uscire dal processo.

use super::{Geocoder, SearchOutcome, Suggestion};
use crate::entities::Destination;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Numero massimo di suggerimenti restituiti per una ricerca
pub const MAX_SUGGESTIONS: usize = 5;

/// Errori di caricamento del file delle destinazioni
#[derive(Debug, Error)]
pub enum GazetteerError {
    #[error("cannot read gazetteer file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid gazetteer file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Default, Clone)]
pub struct Gazetteer {
    places: Vec<Destination>,
}

impl Gazetteer {
    pub fn new(places: Vec<Destination>) -> Self {
        Self { places }
    }

    /// Carica le destinazioni da un array JSON di `Destination`
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, GazetteerError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let places: Vec<Destination> = serde_json::from_str(&raw)?;
        info!(count = places.len(), "Gazetteer loaded");
        Ok(Self::new(places))
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    fn lookup(&self, query: &str) -> SearchOutcome {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return SearchOutcome::Error("Search query cannot be empty".to_string());
        }

        if let Some(exact) = self
            .places
            .iter()
            .find(|p| p.label.to_lowercase() == needle)
        {
            return SearchOutcome::Result(exact.clone());
        }

        // prima i prefissi, poi le sottostringhe
        let mut matches: Vec<&Destination> = self
            .places
            .iter()
            .filter(|p| p.label.to_lowercase().starts_with(&needle))
            .collect();
        matches.extend(self.places.iter().filter(|p| {
            let label = p.label.to_lowercase();
            !label.starts_with(&needle) && label.contains(&needle)
        }));

        SearchOutcome::Suggestions(
            matches
                .into_iter()
                .take(MAX_SUGGESTIONS)
                .map(|d| Suggestion {
                    label: d.label.clone(),
                    destination: d.clone(),
                })
                .collect(),
        )
    }
}

#[async_trait]
impl Geocoder for Gazetteer {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> SearchOutcome {
        let outcome = self.lookup(query);
        debug!(?outcome, "Gazetteer lookup done");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gazetteer() -> Gazetteer {
        Gazetteer::new(vec![
            Destination::new("Evergreen Middle School", -122.03, 47.67),
            Destination::new("Evergreen Park", -122.10, 47.60),
            Destination::new("Lake Evergreen", -122.20, 47.50),
            Destination::new("Central Library", -122.33, 47.61),
        ])
    }

    #[tokio::test]
    async fn blank_query_is_an_error() {
        assert!(matches!(
            gazetteer().search("   ").await,
            SearchOutcome::Error(_)
        ));
    }

    #[tokio::test]
    async fn exact_label_is_a_result() {
        match gazetteer().search("central library").await {
            SearchOutcome::Result(d) => assert_eq!(d.label, "Central Library"),
            other => panic!("expected result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn partial_query_lists_prefixes_first() {
        match gazetteer().search("evergreen").await {
            SearchOutcome::Suggestions(list) => {
                let labels: Vec<&str> = list.iter().map(|s| s.label.as_str()).collect();
                assert_eq!(
                    labels,
                    vec!["Evergreen Middle School", "Evergreen Park", "Lake Evergreen"]
                );
            }
            other => panic!("expected suggestions, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unknown_place_yields_no_suggestions() {
        assert_eq!(
            gazetteer().search("airport").await,
            SearchOutcome::Suggestions(vec![])
        );
    }

    #[test]
    fn loading_reports_io_and_parse_errors() {
        let dir = std::env::temp_dir();

        let missing = dir.join("carpool-gazetteer-missing.json");
        let _ = std::fs::remove_file(&missing);
        assert!(matches!(
            Gazetteer::from_json_file(&missing),
            Err(GazetteerError::Io(_))
        ));

        let broken = dir.join("carpool-gazetteer-broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            Gazetteer::from_json_file(&broken),
            Err(GazetteerError::Parse(_))
        ));

        let valid = dir.join("carpool-gazetteer-valid.json");
        std::fs::write(
            &valid,
            r#"[{"label": "Airport", "coordinate": {"longitude": -122.38, "latitude": 37.62}}]"#,
        )
        .unwrap();
        let loaded = Gazetteer::from_json_file(&valid).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(!loaded.is_empty());

        let _ = std::fs::remove_file(&broken);
        let _ = std::fs::remove_file(&valid);
    }

    #[test]
    fn outcome_wire_format_is_tagged() {
        let json = serde_json::to_value(SearchOutcome::Error("boom".to_string())).unwrap();
        assert_eq!(json["kind"], "error");
        assert_eq!(json["value"], "boom");
    }
}
