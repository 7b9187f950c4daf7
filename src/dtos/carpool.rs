//! Carpool DTOs - Data Transfer Objects per carpool

use crate::entities::{
    Carpool, CarpoolChanges, CarpoolId, Destination, MembershipState, Schedule, TimeOfDay,
    UserId, Weekday,
};
use crate::repositories::DirectoryError;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Orario come arriva dal form: giorni selezionati, ora e minuti del time picker
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ScheduleDTO {
    pub repeating: bool,
    #[serde(default)]
    pub days: Vec<Weekday>,
    pub hour: u8,
    pub minute: u8,
}

impl TryFrom<ScheduleDTO> for Schedule {
    type Error = DirectoryError;

    fn try_from(value: ScheduleDTO) -> Result<Self, Self::Error> {
        let time = TimeOfDay::new(value.hour, value.minute)?;
        Schedule::new(value.repeating, value.days, time)
    }
}

/// Vista dell'orario per il pannello di dettaglio
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScheduleView {
    pub repeating: bool,
    pub days: Vec<Weekday>,
    pub hour: u8,
    pub minute: u8,
    pub time_label: String, // "10:00 am"
    pub summary: String,    // "Repeats on: Mon, Tue"
}

impl From<&Schedule> for ScheduleView {
    fn from(value: &Schedule) -> Self {
        let time = value.time();
        Self {
            repeating: value.is_repeating(),
            days: value.days().iter().copied().collect(),
            hour: time.hour,
            minute: time.minute,
            time_label: time.to_string(),
            summary: value.summary(),
        }
    }
}

/// Proiezione di sola lettura di un carpool, vista da un utente.
/// `revision` permette al client di capire se la sua copia è vecchia.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CarpoolDTO {
    pub carpool_id: CarpoolId,
    pub title: String,
    pub destination: Destination,
    pub owner: UserId,
    pub schedule: ScheduleView,
    pub members: Vec<UserId>,
    pub pending_count: usize,
    pub revision: u64,
    pub membership: MembershipState,
    pub is_owner: bool,
}

impl CarpoolDTO {
    pub fn for_viewer(carpool: &Carpool, viewer: UserId) -> Self {
        Self {
            carpool_id: carpool.id,
            title: carpool.title.clone(),
            destination: carpool.destination.clone(),
            owner: carpool.owner,
            schedule: ScheduleView::from(&carpool.schedule),
            members: carpool.members().iter().copied().collect(),
            pending_count: carpool.pending_requests().len(),
            revision: carpool.revision(),
            membership: carpool.membership_of(viewer),
            is_owner: carpool.is_owner(viewer),
        }
    }
}

/// DTO per pubblicare un nuovo carpool (senza carpool_id)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateCarpoolDTO {
    #[validate(length(max = 120, message = "Title must be at most 120 characters"))]
    pub title: String,
    pub destination: Option<Destination>,
    pub schedule: ScheduleDTO,
}

/// DTO per le modifiche dell'owner, i campi assenti restano invariati
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateCarpoolDTO {
    #[validate(length(max = 120, message = "Title must be at most 120 characters"))]
    pub title: Option<String>,
    pub destination: Option<Destination>,
    pub schedule: Option<ScheduleDTO>,
}

impl TryFrom<UpdateCarpoolDTO> for CarpoolChanges {
    type Error = DirectoryError;

    fn try_from(value: UpdateCarpoolDTO) -> Result<Self, Self::Error> {
        Ok(Self {
            title: value.title,
            destination: value.destination,
            schedule: value.schedule.map(Schedule::try_from).transpose()?,
        })
    }
}
