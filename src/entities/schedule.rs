//! Schedule entity - Fascia oraria settimanale ricorrente di un carpool

use super::enums::Weekday;
use crate::repositories::DirectoryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Orario del giorno, precisione al minuto
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self, DirectoryError> {
        if hour > 23 {
            return Err(DirectoryError::Validation(format!(
                "hour must be between 0 and 23, got {}",
                hour
            )));
        }
        if minute > 59 {
            return Err(DirectoryError::Validation(format!(
                "minute must be between 0 and 59, got {}",
                minute
            )));
        }
        Ok(Self { hour, minute })
    }
}

// formato a 12 ore mostrato dal time picker: "10:00 am", "12:05 pm", "12:30 am"
impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hour, suffix) = match self.hour {
            0 => (12, "am"),
            h @ 1..=11 => (h, "am"),
            12 => (12, "pm"),
            h => (h - 12, "pm"),
        };
        write!(f, "{}:{:02} {}", hour, self.minute, suffix)
    }
}

/// Valore immutabile che descrive quando parte il carpool.
///
/// Invariante: se `repeating` è falso, `days` è vuoto. Un carpool
/// ricorrente deve indicare almeno un giorno.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    days: BTreeSet<Weekday>,
    time: TimeOfDay,
    repeating: bool,
}

impl Schedule {
    pub fn new(
        repeating: bool,
        days: impl IntoIterator<Item = Weekday>,
        time: TimeOfDay,
    ) -> Result<Self, DirectoryError> {
        let days: BTreeSet<Weekday> = days.into_iter().collect();
        if !repeating && !days.is_empty() {
            return Err(DirectoryError::Validation(
                "a non-repeating schedule cannot select weekdays".to_string(),
            ));
        }
        if repeating && days.is_empty() {
            return Err(DirectoryError::Validation(
                "a repeating schedule needs at least one weekday".to_string(),
            ));
        }
        Ok(Self {
            days,
            time,
            repeating,
        })
    }

    /// Corsa singola all'orario indicato
    pub fn once(time: TimeOfDay) -> Self {
        Self {
            days: BTreeSet::new(),
            time,
            repeating: false,
        }
    }

    pub fn days(&self) -> &BTreeSet<Weekday> {
        &self.days
    }

    pub fn time(&self) -> TimeOfDay {
        self.time
    }

    pub fn is_repeating(&self) -> bool {
        self.repeating
    }

    pub fn runs_on(&self, day: Weekday) -> bool {
        self.days.contains(&day)
    }

    /// Riepilogo leggibile per il pannello di dettaglio
    pub fn summary(&self) -> String {
        if !self.repeating {
            return "Does not repeat".to_string();
        }
        let days: Vec<&str> = self.days.iter().map(Weekday::label).collect();
        format!("Repeats on: {}", days.join(", "))
    }
}
