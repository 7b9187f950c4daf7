//! Carpool entity - Viaggio condiviso con destinazione, owner, orario e partecipanti

use super::destination::Destination;
use super::enums::{MembershipState, Transition};
use super::ids::{CarpoolId, UserId};
use super::membership::{Step, next_state};
use super::schedule::Schedule;
use crate::repositories::DirectoryError;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Carpool {
    pub id: CarpoolId,
    pub title: String,
    pub destination: Destination,
    pub owner: UserId,
    pub schedule: Schedule,
    // l'owner non compare mai in questi due insiemi,
    // e un utente sta al massimo in uno dei due
    members: BTreeSet<UserId>,
    pending_requests: BTreeSet<UserId>,
    revision: u64,
}

/// Modifiche dell'owner, solo i campi `Some(_)` vengono applicati
#[derive(Debug, Clone, Default)]
pub struct CarpoolChanges {
    pub title: Option<String>,
    pub destination: Option<Destination>,
    pub schedule: Option<Schedule>,
}

impl Carpool {
    pub fn new(
        id: CarpoolId,
        owner: UserId,
        title: &str,
        destination: Option<Destination>,
        schedule: Schedule,
    ) -> Result<Self, DirectoryError> {
        let title = validate_title(title)?;
        let destination = validate_destination(destination)?;
        Ok(Self {
            id,
            title,
            destination,
            owner,
            schedule,
            members: BTreeSet::new(),
            pending_requests: BTreeSet::new(),
            revision: 0,
        })
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn members(&self) -> &BTreeSet<UserId> {
        &self.members
    }

    pub fn pending_requests(&self) -> &BTreeSet<UserId> {
        &self.pending_requests
    }

    pub fn is_owner(&self, user: UserId) -> bool {
        self.owner == user
    }

    /// Owner o membro approvato
    pub fn is_participant(&self, user: UserId) -> bool {
        self.is_owner(user) || self.members.contains(&user)
    }

    pub fn membership_of(&self, user: UserId) -> MembershipState {
        if self.members.contains(&user) {
            MembershipState::Member
        } else if self.pending_requests.contains(&user) {
            MembershipState::Pending
        } else {
            MembershipState::None
        }
    }

    /// Applica una transizione per `user`, incrementando la revisione solo se
    /// lo stato cambia. In caso di errore il carpool non viene toccato.
    pub fn apply_transition(
        &mut self,
        user: UserId,
        transition: Transition,
    ) -> Result<Step, DirectoryError> {
        let current = self.membership_of(user);
        if self.is_owner(user) {
            return Err(DirectoryError::InvalidTransition {
                from: current,
                transition,
            });
        }

        let step = next_state(current, transition)?;
        if let Step::Move(target) = step {
            self.pending_requests.remove(&user);
            self.members.remove(&user);
            match target {
                MembershipState::Pending => {
                    self.pending_requests.insert(user);
                }
                MembershipState::Member => {
                    self.members.insert(user);
                }
                MembershipState::None => {}
            }
            self.touch();
        }
        Ok(step)
    }

    /// Applica le modifiche dell'owner. Ritorna `true` se qualcosa è cambiato.
    pub fn edit(&mut self, changes: CarpoolChanges) -> Result<bool, DirectoryError> {
        // validazione completa prima di toccare qualsiasi campo
        let title = changes.title.as_deref().map(validate_title).transpose()?;
        let destination = match changes.destination {
            Some(d) => Some(validate_destination(Some(d))?),
            None => None,
        };

        let mut changed = false;
        if let Some(title) = title {
            changed |= title != self.title;
            self.title = title;
        }
        if let Some(destination) = destination {
            changed |= destination != self.destination;
            self.destination = destination;
        }
        if let Some(schedule) = changes.schedule {
            changed |= schedule != self.schedule;
            self.schedule = schedule;
        }

        if changed {
            self.touch();
        }
        Ok(changed)
    }

    /// Rimuove l'utente da membri e richieste pendenti (cancellazione account)
    pub fn drop_user(&mut self, user: UserId) -> bool {
        let removed = self.members.remove(&user) | self.pending_requests.remove(&user);
        if removed {
            self.touch();
        }
        removed
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

fn validate_title(title: &str) -> Result<String, DirectoryError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DirectoryError::Validation(
            "carpool title cannot be empty".to_string(),
        ));
    }
    Ok(title.to_string())
}

fn validate_destination(destination: Option<Destination>) -> Result<Destination, DirectoryError> {
    match destination {
        Some(d) if d.is_set() => Ok(d),
        _ => Err(DirectoryError::Validation(
            "carpool destination must be set".to_string(),
        )),
    }
}
