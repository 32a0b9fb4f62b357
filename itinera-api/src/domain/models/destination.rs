use serde::{Deserialize, Serialize};
use time::Date;

use super::{ContactId, DestinationId, MeetingId};

/// Timezone/currency/language of a destination.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleInfo {
    pub timezone: String,
    pub currency: String,
    pub language: String,
}

/// A stop on a trip. Lives and dies with the owning trip.
///
/// The arrival/departure window should fall inside the trip's window; that
/// is a documented caller responsibility, not enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: DestinationId,
    pub city: String,
    pub country: String,
    pub arrival_date: Date,
    pub departure_date: Date,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub local_contacts: Vec<ContactId>,
    #[serde(default)]
    pub planned_meetings: Vec<MeetingId>,
    #[serde(default)]
    pub locale: LocaleInfo,
}

/// Destination input inside a [`super::TripDraft`]; the store assigns an id
/// to any draft that lacks one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationDraft {
    #[serde(default)]
    pub id: Option<DestinationId>,
    pub city: String,
    pub country: String,
    pub arrival_date: Date,
    pub departure_date: Date,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub locale: LocaleInfo,
}

impl DestinationDraft {
    pub fn new(
        city: impl Into<String>,
        country: impl Into<String>,
        arrival_date: Date,
        departure_date: Date,
    ) -> Self {
        Self {
            id: None,
            city: city.into(),
            country: country.into(),
            arrival_date,
            departure_date,
            purpose: String::new(),
            notes: String::new(),
            activities: Vec::new(),
            locale: LocaleInfo::default(),
        }
    }

    pub fn into_destination(self) -> Destination {
        Destination {
            id: self.id.unwrap_or_else(DestinationId::generate),
            city: self.city,
            country: self.country,
            arrival_date: self.arrival_date,
            departure_date: self.departure_date,
            purpose: self.purpose,
            notes: self.notes,
            activities: self.activities,
            local_contacts: Vec::new(),
            planned_meetings: Vec::new(),
            locale: self.locale,
        }
    }
}
