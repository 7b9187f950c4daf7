//! DTOs module - Data Transfer Objects
//!
//! Questo modulo contiene tutti i DTOs usati per la comunicazione client-server.
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod carpool;
pub mod membership;
pub mod query;
pub mod user;

// Re-exports per facilitare l'import
pub use carpool::{CarpoolDTO, CreateCarpoolDTO, ScheduleDTO, ScheduleView, UpdateCarpoolDTO};
pub use membership::{MembershipDTO, PendingRequestDTO};
pub use query::{CarpoolQuery, SearchQuery};
pub use user::{CreateUserDTO, LoginDTO, UserDTO};
