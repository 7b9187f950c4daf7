//! Identificativi - Newtype per non confondere id di utenti e di carpool

use serde::{Deserialize, Serialize};
use std::fmt;

/// Id stabile fornito dall'identity provider, trattato in modo opaco
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        UserId(id)
    }
}

/// Id assegnato dalla directory alla creazione, immutabile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarpoolId(pub u64);

impl fmt::Display for CarpoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CarpoolId {
    fn from(id: u64) -> Self {
        CarpoolId(id)
    }
}
