//! Membership DTOs - Esito delle transizioni e richieste pendenti

use crate::entities::{CarpoolId, MembershipState, UserId};
use crate::repositories::TransitionResult;
use serde::{Deserialize, Serialize};

/// Risposta di join / cancel / leave / approve / decline
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MembershipDTO {
    pub carpool_id: CarpoolId,
    pub user_id: UserId,
    pub state: MembershipState,
    pub revision: u64,
    pub changed: bool, // false per le richieste ripetute
}

impl MembershipDTO {
    pub fn new(carpool_id: CarpoolId, user_id: UserId, result: TransitionResult) -> Self {
        Self {
            carpool_id,
            user_id,
            state: result.state,
            revision: result.revision,
            changed: result.changed,
        }
    }
}

/// Richiesta in attesa dell'approvazione dell'owner
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PendingRequestDTO {
    pub user_id: UserId,
    pub display_name: Option<String>,
}
