//! Destination entity - Punto geocodificato con etichetta

use serde::{Deserialize, Serialize};

/// Coordinate così come restituite dal provider di geocoding.
/// Il core le memorizza senza validarle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Destination {
    pub label: String,
    pub coordinate: Coordinate,
}

impl Destination {
    pub fn new(label: impl Into<String>, longitude: f64, latitude: f64) -> Self {
        Self {
            label: label.into(),
            coordinate: Coordinate {
                longitude,
                latitude,
            },
        }
    }

    /// Una destinazione senza etichetta equivale a nessuna destinazione
    pub fn is_set(&self) -> bool {
        !self.label.trim().is_empty()
    }
}
