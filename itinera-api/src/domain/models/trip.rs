use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::{Date, OffsetDateTime};

use super::{
    Budget, ChecklistItem, ChecklistItemId, ContactId, Destination, DestinationDraft, Expense,
    MeetingId, NewTraveler, Traveler, TripId,
};

/// Lifecycle status of a trip.
///
/// The happy path is planning → confirmed → in_progress → completed;
/// cancelled is terminal from any state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TripStatus {
    Planning,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TripPurpose {
    Business,
    Leisure,
    Mixed,
    Relocation,
    Other,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Visibility {
    #[default]
    Private,
    Shared,
    Public,
}

/// The root planning record: dates, destinations, budget, checklist and
/// weak links into the sibling meetings/contacts stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: TripId,
    pub title: String,
    pub description: String,
    pub purpose: TripPurpose,
    pub status: TripStatus,
    pub start_date: Date,
    pub end_date: Date,
    pub timezone: String,
    pub current_location: Option<String>,
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub archived: bool,
    pub destinations: Vec<Destination>,
    pub travelers: Vec<Traveler>,
    pub budget: Budget,
    pub checklist: Vec<ChecklistItem>,
    pub expenses: Vec<Expense>,
    pub related_meetings: Vec<MeetingId>,
    pub related_contacts: Vec<ContactId>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Trip {
    /// Whole days between the start and end date.
    ///
    /// Creation guarantees `end_date > start_date`; patches that move the
    /// dates are not re-validated, so keeping the window well-formed after
    /// an update is the caller's responsibility.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).whole_days()
    }

    /// Checklist completion as a percentage; an empty checklist is 0.
    pub fn progress(&self) -> f64 {
        if self.checklist.is_empty() {
            return 0.0;
        }
        let completed = self.checklist.iter().filter(|item| item.completed).count();
        completed as f64 / self.checklist.len() as f64 * 100.0
    }

    /// Incomplete items whose due date is strictly in the past.
    pub fn overdue_tasks(&self, now: OffsetDateTime) -> Vec<&ChecklistItem> {
        self.checklist
            .iter()
            .filter(|item| item.is_overdue(now))
            .collect()
    }

    /// Incomplete items due between `now` (inclusive) and three days out.
    pub fn due_soon_tasks(&self, now: OffsetDateTime) -> Vec<&ChecklistItem> {
        self.checklist
            .iter()
            .filter(|item| item.is_due_soon(now))
            .collect()
    }

    pub fn checklist_item(&self, item_id: ChecklistItemId) -> Option<&ChecklistItem> {
        self.checklist.iter().find(|item| item.id == item_id)
    }

    /// Sum of recorded expenses. Distinct from the budget, which is a plan.
    pub fn total_spent(&self) -> f64 {
        self.expenses.iter().map(|expense| expense.amount).sum()
    }
}

/// Input for creating a trip. Ids, status, timestamps and the organizer
/// traveler are filled in by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub purpose: TripPurpose,
    pub start_date: Date,
    pub end_date: Date,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub destinations: Vec<DestinationDraft>,
    #[serde(default)]
    pub budget: Option<Budget>,
    pub organizer: NewTraveler,
    #[serde(default)]
    pub companions: Vec<NewTraveler>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl TripDraft {
    pub fn new(
        title: impl Into<String>,
        purpose: TripPurpose,
        start_date: Date,
        end_date: Date,
        organizer: NewTraveler,
    ) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            purpose,
            start_date,
            end_date,
            timezone: default_timezone(),
            tags: Vec::new(),
            visibility: Visibility::default(),
            destinations: Vec::new(),
            budget: None,
            organizer,
            companions: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_destination(mut self, destination: DestinationDraft) -> Self {
        self.destinations.push(destination);
        self
    }

    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Partial update for a trip. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub purpose: Option<TripPurpose>,
    pub status: Option<TripStatus>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub timezone: Option<String>,
    pub current_location: Option<String>,
    pub tags: Option<Vec<String>>,
    pub visibility: Option<Visibility>,
    pub archived: Option<bool>,
    pub budget: Option<Budget>,
    pub destinations: Option<Vec<Destination>>,
}

impl TripPatch {
    /// Merge the set fields into `trip`. Timestamp bumping is the store's job.
    pub fn apply(self, trip: &mut Trip) {
        if let Some(title) = self.title {
            trip.title = title;
        }
        if let Some(description) = self.description {
            trip.description = description;
        }
        if let Some(purpose) = self.purpose {
            trip.purpose = purpose;
        }
        if let Some(status) = self.status {
            trip.status = status;
        }
        if let Some(start_date) = self.start_date {
            trip.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            trip.end_date = end_date;
        }
        if let Some(timezone) = self.timezone {
            trip.timezone = timezone;
        }
        if let Some(location) = self.current_location {
            trip.current_location = Some(location);
        }
        if let Some(tags) = self.tags {
            trip.tags = tags;
        }
        if let Some(visibility) = self.visibility {
            trip.visibility = visibility;
        }
        if let Some(archived) = self.archived {
            trip.archived = archived;
        }
        if let Some(budget) = self.budget {
            trip.budget = budget;
        }
        if let Some(destinations) = self.destinations {
            trip.destinations = destinations;
        }
    }

    pub fn status(status: TripStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}
