//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene le entità del servizio di membership dei carpool:
//! orario ricorrente, destinazione, carpool con i suoi partecipanti, la
//! macchina a stati della membership e l'utente autenticato.

pub mod carpool;
pub mod destination;
pub mod enums;
pub mod ids;
pub mod membership;
pub mod schedule;
pub mod user;

// Re-exports per facilitare l'import
pub use carpool::{Carpool, CarpoolChanges};
pub use destination::{Coordinate, Destination};
pub use enums::{MembershipState, Transition, Weekday};
pub use ids::{CarpoolId, UserId};
pub use membership::{Step, TransitionError, next_state};
pub use schedule::{Schedule, TimeOfDay};
pub use user::User;
