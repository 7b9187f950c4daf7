//! Repositories module - Coordinatore per tutte le directory del progetto
//!
//! Lo stato vive in memoria: la persistenza durevole e la sincronizzazione
//! tra dispositivi sono compito di un layer esterno, che osserva le modifiche
//! tramite il numero di revisione di ogni carpool.

// Dichiarazione dei sotto-moduli
pub mod carpool;
pub mod error;
pub mod traits;
pub mod user;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Create, Delete, Read};

pub use carpool::{CarpoolDirectory, PurgeReport, TransitionResult};
pub use error::DirectoryError;
pub use user::{NewUser, UserRepository};
