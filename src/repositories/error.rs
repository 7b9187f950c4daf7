//! Errori di dominio restituiti dalle directory in memoria

use crate::entities::{MembershipState, Transition, TransitionError};
use thiserror::Error;

/// Tutti gli errori sono recuperabili dal chiamante: nessuna operazione
/// fallita lascia modifiche parziali.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// Richiesta di creazione o modifica malformata
    #[error("validation failed: {0}")]
    Validation(String),

    /// Carpool o utente sconosciuto
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Cambio di stato non ammesso dalla macchina a stati
    #[error("cannot {transition} from state {from}")]
    InvalidTransition {
        from: MembershipState,
        transition: Transition,
    },

    /// Risorsa già esistente (es. email già registrata)
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<TransitionError> for DirectoryError {
    fn from(err: TransitionError) -> Self {
        DirectoryError::InvalidTransition {
            from: err.from,
            transition: err.transition,
        }
    }
}
