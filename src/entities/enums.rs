//! Enumerazioni - Tipi enumerati utilizzati nelle entità

use serde::{Deserialize, Serialize};
use std::fmt;

// ********************* ENUMERAZIONI UTILI **********************//

/// Giorno della settimana, domenica per prima come nel selettore dell'app.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Weekday {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Weekday {
    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Sun => "Sun",
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Relazione di un utente con un carpool. Derivata sempre dagli insiemi
/// `members` / `pending_requests` del carpool, mai salvata altrove.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum MembershipState {
    None,
    Pending,
    Member,
}

impl fmt::Display for MembershipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MembershipState::None => "NONE",
            MembershipState::Pending => "PENDING",
            MembershipState::Member => "MEMBER",
        };
        f.write_str(s)
    }
}

/// Richieste di cambio stato sulla membership di un utente.
///
/// `Join`, `Cancel` e `Leave` sono emesse dall'utente stesso,
/// `Approve` e `Decline` dall'owner del carpool.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Join,
    Cancel,
    Approve,
    Decline,
    Leave,
}

impl Transition {
    /// Vero per le transizioni che solo l'owner può richiedere
    pub fn requires_owner(&self) -> bool {
        matches!(self, Transition::Approve | Transition::Decline)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Transition::Join => "join",
            Transition::Cancel => "cancel",
            Transition::Approve => "approve",
            Transition::Decline => "decline",
            Transition::Leave => "leave",
        };
        f.write_str(s)
    }
}
