use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::TravelerId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TravelerRole {
    Organizer,
    Companion,
}

/// A person on a trip. The creating user is materialized as the first
/// traveler with the organizer role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Traveler {
    pub id: TravelerId,
    pub name: String,
    pub email: Option<String>,
    pub role: TravelerRole,
}

/// Traveler input on a trip draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTraveler {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl NewTraveler {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn into_traveler(self, role: TravelerRole) -> Traveler {
        Traveler {
            id: TravelerId::generate(),
            name: self.name,
            email: self.email,
            role,
        }
    }
}
