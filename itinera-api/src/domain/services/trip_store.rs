use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use time::{Date, OffsetDateTime};
use tracing::{debug, warn};

use crate::domain::{
    models::{
        ChecklistItem, ChecklistItemId, ChecklistItemPatch, ContactId, Expense, ExpenseId,
        MeetingId, NewChecklistItem, NewExpense, TravelInsights, TravelerRole, Trip, TripDraft,
        TripId, TripPatch, TripStatus,
    },
    ports::outbound::TripBackend,
    TripStoreError,
};

/// Upper bound on the cached upcoming-trips view.
const UPCOMING_LIMIT: usize = 5;

#[derive(Default)]
struct StoreState {
    trips: HashMap<TripId, Trip>,
    selected: Option<TripId>,
    upcoming: Vec<Trip>,
    loading: bool,
    error: Option<String>,
    fetch_generation: u64,
}

impl StoreState {
    /// Future-dated, non-cancelled trips, ascending by start date, first 5.
    fn recompute_upcoming(&mut self, today: Date) {
        let mut upcoming: Vec<Trip> = self
            .trips
            .values()
            .filter(|trip| trip.start_date > today && trip.status != TripStatus::Cancelled)
            .cloned()
            .collect();
        upcoming.sort_by(|a, b| a.start_date.cmp(&b.start_date));
        upcoming.truncate(UPCOMING_LIMIT);
        self.upcoming = upcoming;
    }
}

/// The trip/checklist state engine.
///
/// Owns the trip collection and performs every mutation and derived view.
/// All operations are synchronous in-memory updates except [`fetch_trips`],
/// which suspends only at the backend call; the internal lock is never held
/// across an await, so each mutation lands as a single atomic replacement
/// and readers holding a previously cloned snapshot never observe a
/// half-applied update.
///
/// [`fetch_trips`]: TripStore::fetch_trips
pub struct TripStore {
    backend: Arc<dyn TripBackend>,
    state: RwLock<StoreState>,
}

impl TripStore {
    pub fn new(backend: Arc<dyn TripBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(StoreState::default()),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoreState> {
        self.state.read().expect("trip store lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, StoreState> {
        self.state.write().expect("trip store lock poisoned")
    }

    // ========================================================================
    // Trip lifecycle
    // ========================================================================

    /// Create a trip from a draft.
    ///
    /// Rejects drafts whose start date is not strictly before the end date
    /// before touching any state. The creator is materialized as the first
    /// traveler with the organizer role. No idempotency: two identical calls
    /// create two trips.
    pub fn create_trip(&self, draft: TripDraft) -> Result<Trip, TripStoreError> {
        if draft.start_date >= draft.end_date {
            return Err(TripStoreError::InvalidDateRange {
                start: draft.start_date,
                end: draft.end_date,
            });
        }

        let now = OffsetDateTime::now_utc();
        let mut travelers = vec![draft.organizer.into_traveler(TravelerRole::Organizer)];
        travelers.extend(
            draft
                .companions
                .into_iter()
                .map(|companion| companion.into_traveler(TravelerRole::Companion)),
        );

        let budget = draft.budget.unwrap_or_default();
        let trip = Trip {
            id: TripId::generate(),
            title: draft.title,
            description: draft.description,
            purpose: draft.purpose,
            status: TripStatus::Planning,
            start_date: draft.start_date,
            end_date: draft.end_date,
            timezone: draft.timezone,
            current_location: None,
            tags: draft.tags,
            visibility: draft.visibility,
            archived: false,
            destinations: draft
                .destinations
                .into_iter()
                .map(|destination| destination.into_destination())
                .collect(),
            travelers,
            budget,
            checklist: Vec::new(),
            expenses: Vec::new(),
            related_meetings: Vec::new(),
            related_contacts: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        if let Some(warning) = trip.budget.consistency_warning() {
            warn!(trip = %trip.id, "{warning}");
        }

        let mut state = self.write();
        state.trips.insert(trip.id, trip.clone());
        state.error = None;
        state.recompute_upcoming(now.date());
        Ok(trip)
    }

    /// Merge a partial update into the trip and bump `updated_at`.
    ///
    /// Unknown ids are signalled as [`TripStoreError::TripNotFound`] rather
    /// than silently ignored. The selection needs no separate sync because
    /// it is resolved against the collection on every read.
    pub fn update_trip(&self, id: TripId, patch: TripPatch) -> Result<Trip, TripStoreError> {
        let now = OffsetDateTime::now_utc();
        let mut state = self.write();
        let trip = state
            .trips
            .get_mut(&id)
            .ok_or(TripStoreError::TripNotFound(id))?;

        patch.apply(trip);
        trip.updated_at = now;
        if let Some(warning) = trip.budget.consistency_warning() {
            warn!(trip = %id, "{warning}");
        }
        let updated = trip.clone();
        state.error = None;
        state.recompute_upcoming(now.date());
        Ok(updated)
    }

    /// Remove the trip; clears the selection if it pointed at it.
    pub fn delete_trip(&self, id: TripId) -> Result<(), TripStoreError> {
        let mut state = self.write();
        state
            .trips
            .remove(&id)
            .ok_or(TripStoreError::TripNotFound(id))?;
        if state.selected == Some(id) {
            state.selected = None;
        }
        state.error = None;
        state.recompute_upcoming(OffsetDateTime::now_utc().date());
        Ok(())
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Set (or clear) the selected trip id.
    ///
    /// The id is not required to exist; a dangling selection simply resolves
    /// to `None` on read.
    pub fn select_trip(&self, id: Option<TripId>) {
        self.write().selected = id;
    }

    /// Resolve the selection against the live collection.
    pub fn selected_trip(&self) -> Option<Trip> {
        let state = self.read();
        state
            .selected
            .and_then(|id| state.trips.get(&id))
            .cloned()
    }

    // ========================================================================
    // Checklist lifecycle
    // ========================================================================

    /// Append a checklist item; `completed` defaults to false unless the
    /// caller overrides it.
    pub fn add_checklist_item(
        &self,
        trip_id: TripId,
        new_item: NewChecklistItem,
    ) -> Result<ChecklistItem, TripStoreError> {
        self.with_trip_mut(trip_id, |trip| {
            let item = new_item.into_item(ChecklistItemId::generate());
            trip.checklist.push(item.clone());
            Ok(item)
        })
    }

    /// Merge a partial update into the matching item.
    ///
    /// An unknown item id leaves the checklist untouched and is signalled
    /// as [`TripStoreError::ChecklistItemNotFound`].
    pub fn update_checklist_item(
        &self,
        trip_id: TripId,
        item_id: ChecklistItemId,
        patch: ChecklistItemPatch,
    ) -> Result<ChecklistItem, TripStoreError> {
        self.with_trip_mut(trip_id, |trip| {
            let item = trip
                .checklist
                .iter_mut()
                .find(|item| item.id == item_id)
                .ok_or(TripStoreError::ChecklistItemNotFound {
                    trip: trip_id,
                    item: item_id,
                })?;
            patch.apply(item);
            Ok(item.clone())
        })
    }

    /// Toggle completion independently of any other edit.
    pub fn set_checklist_item_completed(
        &self,
        trip_id: TripId,
        item_id: ChecklistItemId,
        completed: bool,
    ) -> Result<ChecklistItem, TripStoreError> {
        self.update_checklist_item(
            trip_id,
            item_id,
            ChecklistItemPatch {
                completed: Some(completed),
                ..ChecklistItemPatch::default()
            },
        )
    }

    pub fn remove_checklist_item(
        &self,
        trip_id: TripId,
        item_id: ChecklistItemId,
    ) -> Result<(), TripStoreError> {
        self.with_trip_mut(trip_id, |trip| {
            let before = trip.checklist.len();
            trip.checklist.retain(|item| item.id != item_id);
            if trip.checklist.len() == before {
                return Err(TripStoreError::ChecklistItemNotFound {
                    trip: trip_id,
                    item: item_id,
                });
            }
            Ok(())
        })
    }

    // ========================================================================
    // Expenses and weak links
    // ========================================================================

    pub fn add_expense(
        &self,
        trip_id: TripId,
        new_expense: NewExpense,
    ) -> Result<Expense, TripStoreError> {
        self.with_trip_mut(trip_id, |trip| {
            let expense = new_expense.into_expense(ExpenseId::generate());
            trip.expenses.push(expense.clone());
            Ok(expense)
        })
    }

    /// Append the meeting id to the relation list. Duplicates are not
    /// collapsed; de-duplication is the caller's responsibility.
    pub fn link_meeting(&self, trip_id: TripId, meeting_id: MeetingId) -> Result<(), TripStoreError> {
        self.with_trip_mut(trip_id, |trip| {
            trip.related_meetings.push(meeting_id);
            Ok(())
        })
    }

    /// Append the contact id to the relation list; same duplicate semantics
    /// as [`link_meeting`](TripStore::link_meeting).
    pub fn link_contact(&self, trip_id: TripId, contact_id: ContactId) -> Result<(), TripStoreError> {
        self.with_trip_mut(trip_id, |trip| {
            trip.related_contacts.push(contact_id);
            Ok(())
        })
    }

    // ========================================================================
    // Queries and derived views
    // ========================================================================

    /// Snapshot of the full collection, ordered by start date for stable
    /// output (storage order itself is meaningless).
    pub fn trips(&self) -> Vec<Trip> {
        let mut trips: Vec<Trip> = self.read().trips.values().cloned().collect();
        trips.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.title.cmp(&b.title)));
        trips
    }

    pub fn trip(&self, id: TripId) -> Option<Trip> {
        self.read().trips.get(&id).cloned()
    }

    /// Recompute, cache and return the upcoming view.
    pub fn upcoming_trips(&self) -> Vec<Trip> {
        let mut state = self.write();
        state.recompute_upcoming(OffsetDateTime::now_utc().date());
        state.upcoming.clone()
    }

    /// The cached upcoming view as of the last recompute.
    pub fn cached_upcoming_trips(&self) -> Vec<Trip> {
        self.read().upcoming.clone()
    }

    /// Pure interval-overlap query, no caching: a trip `[a, b]` matches the
    /// window `[start, end]` when either endpoint falls inside the window or
    /// the trip spans it entirely.
    pub fn trips_in_range(&self, start: Date, end: Date) -> Vec<Trip> {
        self.read()
            .trips
            .values()
            .filter(|trip| {
                let a = trip.start_date;
                let b = trip.end_date;
                (a >= start && a <= end) || (b >= start && b <= end) || (a <= start && b >= end)
            })
            .cloned()
            .collect()
    }

    pub fn insights(&self, top_n: usize) -> TravelInsights {
        let state = self.read();
        TravelInsights::compute(state.trips.values(), top_n)
    }

    pub fn loading(&self) -> bool {
        self.read().loading
    }

    /// The last failure message; overwritten by the next failure, cleared
    /// by the next successful operation or [`clear_error`](TripStore::clear_error).
    pub fn last_error(&self) -> Option<String> {
        self.read().error.clone()
    }

    pub fn clear_error(&self) {
        self.write().error = None;
    }

    // ========================================================================
    // Backend refresh
    // ========================================================================

    /// Refresh the collection from the persistence collaborator.
    ///
    /// Enters the loading state, clears the error slot, awaits the backend,
    /// then replaces the collection and recomputes the upcoming cache. A
    /// generation token is captured before the await; a completion whose
    /// token is stale (another fetch started meanwhile) is discarded so a
    /// slow response can never overwrite a newer one.
    pub async fn fetch_trips(&self) -> Result<(), TripStoreError> {
        let generation = {
            let mut state = self.write();
            state.fetch_generation += 1;
            state.loading = true;
            state.error = None;
            state.fetch_generation
        };

        let result = self.backend.fetch_trips().await;

        let mut state = self.write();
        if state.fetch_generation != generation {
            debug!(generation, "discarding stale fetch result");
            return Ok(());
        }
        state.loading = false;
        match result {
            Ok(trips) => {
                state.trips = trips.into_iter().map(|trip| (trip.id, trip)).collect();
                state.recompute_upcoming(OffsetDateTime::now_utc().date());
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                state.error = Some(message.clone());
                Err(TripStoreError::Backend(message))
            }
        }
    }

    /// Shared helper for per-trip mutations: applies `f`, bumps
    /// `updated_at`, clears the error slot on success.
    fn with_trip_mut<T>(
        &self,
        trip_id: TripId,
        f: impl FnOnce(&mut Trip) -> Result<T, TripStoreError>,
    ) -> Result<T, TripStoreError> {
        let mut state = self.write();
        let trip = state
            .trips
            .get_mut(&trip_id)
            .ok_or(TripStoreError::TripNotFound(trip_id))?;
        let value = f(trip)?;
        trip.updated_at = OffsetDateTime::now_utc();
        state.error = None;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::SimulatedBackend;
    use crate::domain::models::{
        BudgetCategory, ChecklistCategory, DestinationDraft, NewTraveler, Priority, TripPurpose,
    };
    use std::time::Duration as StdDuration;
    use time::macros::{date, datetime};
    use time::Duration;

    fn make_store() -> TripStore {
        TripStore::new(Arc::new(SimulatedBackend::default()))
    }

    fn make_draft(title: &str, start: Date, end: Date) -> TripDraft {
        TripDraft::new(
            title,
            TripPurpose::Business,
            start,
            end,
            NewTraveler::new("Alex Berg").with_email("alex@example.com"),
        )
    }

    fn future_date(days: i64) -> Date {
        OffsetDateTime::now_utc().date() + Duration::days(days)
    }

    #[test]
    fn create_trip_derives_duration_and_status() {
        let store = make_store();
        let trip = store
            .create_trip(make_draft("Berlin", date!(2025 - 06 - 01), date!(2025 - 06 - 05)))
            .unwrap();

        assert_eq!(trip.duration_days(), 4);
        assert_eq!(trip.status, TripStatus::Planning);
        assert!(trip.checklist.is_empty());
        assert_eq!(store.trips().len(), 1);
    }

    #[test]
    fn create_trip_materializes_organizer_as_first_traveler() {
        let store = make_store();
        let draft = make_draft("Berlin", date!(2025 - 06 - 01), date!(2025 - 06 - 05));
        let trip = store.create_trip(draft).unwrap();

        assert_eq!(trip.travelers[0].name, "Alex Berg");
        assert_eq!(trip.travelers[0].role, TravelerRole::Organizer);
    }

    #[test]
    fn create_trip_assigns_ids_to_destinations() {
        let store = make_store();
        let draft = make_draft("Berlin", date!(2025 - 06 - 01), date!(2025 - 06 - 05))
            .with_destination(DestinationDraft::new(
                "Berlin",
                "Germany",
                date!(2025 - 06 - 01),
                date!(2025 - 06 - 05),
            ));
        let trip = store.create_trip(draft).unwrap();

        assert_eq!(trip.destinations.len(), 1);
    }

    #[test]
    fn invalid_date_range_is_rejected_without_mutation() {
        let store = make_store();
        let result =
            store.create_trip(make_draft("Bad", date!(2025 - 06 - 05), date!(2025 - 06 - 05)));

        assert!(matches!(result, Err(TripStoreError::InvalidDateRange { .. })));
        assert!(store.trips().is_empty());
    }

    #[test]
    fn update_trip_merges_and_bumps_updated_at() {
        let store = make_store();
        let trip = store
            .create_trip(make_draft("Berlin", date!(2025 - 06 - 01), date!(2025 - 06 - 05)))
            .unwrap();

        let updated = store
            .update_trip(
                trip.id,
                TripPatch {
                    title: Some("Berlin Q3".to_string()),
                    status: Some(TripStatus::Confirmed),
                    ..TripPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "Berlin Q3");
        assert_eq!(updated.status, TripStatus::Confirmed);
        assert_eq!(updated.start_date, trip.start_date);
        assert!(updated.updated_at >= trip.updated_at);
    }

    #[test]
    fn patched_dates_are_not_revalidated() {
        let store = make_store();
        let trip = store
            .create_trip(make_draft("Berlin", date!(2025 - 06 - 01), date!(2025 - 06 - 05)))
            .unwrap();

        // Date validation happens at creation only; a patch may move the
        // window freely and the derived duration simply follows.
        let updated = store
            .update_trip(
                trip.id,
                TripPatch {
                    end_date: Some(date!(2025 - 05 - 30)),
                    ..TripPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.end_date, date!(2025 - 05 - 30));
        assert_eq!(updated.duration_days(), -2);
    }

    #[test]
    fn update_unknown_trip_signals_not_found() {
        let store = make_store();
        let result = store.update_trip(TripId::generate(), TripPatch::default());
        assert!(matches!(result, Err(TripStoreError::TripNotFound(_))));
    }

    #[test]
    fn delete_selected_trip_clears_selection() {
        let store = make_store();
        let trip = store
            .create_trip(make_draft("Berlin", date!(2025 - 06 - 01), date!(2025 - 06 - 05)))
            .unwrap();
        store.select_trip(Some(trip.id));
        assert_eq!(store.selected_trip().map(|t| t.id), Some(trip.id));

        store.delete_trip(trip.id).unwrap();

        assert!(store.selected_trip().is_none());
        assert!(store.trip(trip.id).is_none());
    }

    #[test]
    fn selection_is_resolved_against_live_collection() {
        let store = make_store();
        let trip = store
            .create_trip(make_draft("Berlin", date!(2025 - 06 - 01), date!(2025 - 06 - 05)))
            .unwrap();
        store.select_trip(Some(trip.id));

        store
            .update_trip(
                trip.id,
                TripPatch {
                    title: Some("Renamed".to_string()),
                    ..TripPatch::default()
                },
            )
            .unwrap();

        // No second copy to drift: the selection reflects the update.
        assert_eq!(store.selected_trip().unwrap().title, "Renamed");
    }

    #[test]
    fn upcoming_trips_are_future_non_cancelled_sorted_and_capped() {
        let store = make_store();
        for offset in [40, 10, 20, 30, 50, 60] {
            store
                .create_trip(make_draft(
                    &format!("trip+{offset}"),
                    future_date(offset),
                    future_date(offset + 3),
                ))
                .unwrap();
        }
        // Past and cancelled trips never qualify.
        store
            .create_trip(make_draft("past", future_date(-20), future_date(-15)))
            .unwrap();
        let cancelled = store
            .create_trip(make_draft("cancelled", future_date(5), future_date(8)))
            .unwrap();
        store
            .update_trip(cancelled.id, TripPatch::status(TripStatus::Cancelled))
            .unwrap();

        let upcoming = store.upcoming_trips();

        assert_eq!(upcoming.len(), 5);
        let today = OffsetDateTime::now_utc().date();
        assert!(upcoming
            .iter()
            .all(|trip| trip.start_date > today && trip.status != TripStatus::Cancelled));
        assert!(upcoming.windows(2).all(|w| w[0].start_date <= w[1].start_date));
        assert_eq!(upcoming[0].title, "trip+10");
        assert_eq!(store.cached_upcoming_trips().len(), 5);
    }

    #[test]
    fn range_query_matches_all_three_overlap_cases() {
        let store = make_store();
        // Ends inside the window.
        let tail = store
            .create_trip(make_draft("tail", date!(2025 - 06 - 25), date!(2025 - 07 - 05)))
            .unwrap();
        // Starts inside the window.
        let head = store
            .create_trip(make_draft("head", date!(2025 - 07 - 08), date!(2025 - 07 - 20)))
            .unwrap();
        // Spans the window entirely.
        let spanning = store
            .create_trip(make_draft("span", date!(2025 - 06 - 01), date!(2025 - 08 - 01)))
            .unwrap();
        // Disjoint.
        store
            .create_trip(make_draft("later", date!(2025 - 09 - 01), date!(2025 - 09 - 10)))
            .unwrap();

        let matched = store.trips_in_range(date!(2025 - 07 - 01), date!(2025 - 07 - 10));
        let mut ids: Vec<TripId> = matched.iter().map(|trip| trip.id).collect();
        ids.sort_by_key(|id| id.to_string());
        let mut expected = vec![tail.id, head.id, spanning.id];
        expected.sort_by_key(|id| id.to_string());

        assert_eq!(ids, expected);
    }

    #[test]
    fn checklist_item_defaults_incomplete_and_progress_tracks_completion() {
        let store = make_store();
        let trip = store
            .create_trip(make_draft("Berlin", date!(2025 - 06 - 01), date!(2025 - 06 - 05)))
            .unwrap();
        assert_eq!(store.trip(trip.id).unwrap().progress(), 0.0);

        let item = store
            .add_checklist_item(
                trip.id,
                NewChecklistItem::new("visa", ChecklistCategory::Documents, Priority::High),
            )
            .unwrap();
        assert!(!item.completed);
        assert_eq!(store.trip(trip.id).unwrap().progress(), 0.0);

        store
            .set_checklist_item_completed(trip.id, item.id, true)
            .unwrap();
        assert_eq!(store.trip(trip.id).unwrap().progress(), 100.0);
    }

    #[test]
    fn overdue_item_leaves_view_when_completed() {
        let now = datetime!(2025-06-01 00:00 UTC);
        let store = make_store();
        let trip = store
            .create_trip(make_draft("Berlin", date!(2025 - 06 - 01), date!(2025 - 06 - 05)))
            .unwrap();
        let item = store
            .add_checklist_item(
                trip.id,
                NewChecklistItem::new("visa", ChecklistCategory::Documents, Priority::High)
                    .with_due_date(datetime!(2025-05-20 00:00 UTC)),
            )
            .unwrap();

        let snapshot = store.trip(trip.id).unwrap();
        assert_eq!(snapshot.overdue_tasks(now).len(), 1);

        store
            .set_checklist_item_completed(trip.id, item.id, true)
            .unwrap();
        let snapshot = store.trip(trip.id).unwrap();
        assert!(snapshot.overdue_tasks(now).is_empty());
        assert_eq!(snapshot.progress(), 100.0);
    }

    #[test]
    fn updating_unknown_item_leaves_checklist_unchanged() {
        let store = make_store();
        let trip = store
            .create_trip(make_draft("Berlin", date!(2025 - 06 - 01), date!(2025 - 06 - 05)))
            .unwrap();
        let item = store
            .add_checklist_item(
                trip.id,
                NewChecklistItem::new("visa", ChecklistCategory::Documents, Priority::High),
            )
            .unwrap();

        let result = store.update_checklist_item(
            trip.id,
            ChecklistItemId::generate(),
            ChecklistItemPatch {
                title: Some("hijacked".to_string()),
                ..ChecklistItemPatch::default()
            },
        );

        assert!(matches!(
            result,
            Err(TripStoreError::ChecklistItemNotFound { .. })
        ));
        let checklist = store.trip(trip.id).unwrap().checklist;
        assert_eq!(checklist.len(), 1);
        assert_eq!(checklist[0].title, item.title);
    }

    #[test]
    fn remove_checklist_item_filters_by_id() {
        let store = make_store();
        let trip = store
            .create_trip(make_draft("Berlin", date!(2025 - 06 - 01), date!(2025 - 06 - 05)))
            .unwrap();
        let keep = store
            .add_checklist_item(
                trip.id,
                NewChecklistItem::new("keep", ChecklistCategory::Packing, Priority::Low),
            )
            .unwrap();
        let remove = store
            .add_checklist_item(
                trip.id,
                NewChecklistItem::new("remove", ChecklistCategory::Packing, Priority::Low),
            )
            .unwrap();

        store.remove_checklist_item(trip.id, remove.id).unwrap();

        let checklist = store.trip(trip.id).unwrap().checklist;
        assert_eq!(checklist.len(), 1);
        assert_eq!(checklist[0].id, keep.id);
    }

    #[test]
    fn seeded_checklist_convention_is_five_items() {
        let store = make_store();
        let trip = store
            .create_trip(make_draft("Berlin", date!(2025 - 06 - 01), date!(2025 - 06 - 05)))
            .unwrap();
        for item in ChecklistItem::default_seed() {
            store.add_checklist_item(trip.id, item).unwrap();
        }

        let snapshot = store.trip(trip.id).unwrap();
        assert_eq!(snapshot.checklist.len(), 5);
        assert!(snapshot.checklist.iter().all(|item| !item.completed));
    }

    #[test]
    fn linking_does_not_deduplicate() {
        let store = make_store();
        let trip = store
            .create_trip(make_draft("Berlin", date!(2025 - 06 - 01), date!(2025 - 06 - 05)))
            .unwrap();

        store.link_meeting(trip.id, MeetingId::new("m-1")).unwrap();
        store.link_meeting(trip.id, MeetingId::new("m-1")).unwrap();
        store.link_contact(trip.id, ContactId::new("c-1")).unwrap();

        let snapshot = store.trip(trip.id).unwrap();
        assert_eq!(snapshot.related_meetings.len(), 2);
        assert_eq!(snapshot.related_contacts.len(), 1);
    }

    #[test]
    fn insights_aggregate_days_spend_and_destinations() {
        let store = make_store();
        let first = store
            .create_trip(
                make_draft("Berlin", date!(2025 - 06 - 01), date!(2025 - 06 - 05))
                    .with_destination(DestinationDraft::new(
                        "Berlin",
                        "Germany",
                        date!(2025 - 06 - 01),
                        date!(2025 - 06 - 05),
                    )),
            )
            .unwrap();
        store
            .create_trip(
                make_draft("Berlin again", date!(2025 - 07 - 01), date!(2025 - 07 - 03))
                    .with_destination(DestinationDraft::new(
                        "Berlin",
                        "Germany",
                        date!(2025 - 07 - 01),
                        date!(2025 - 07 - 03),
                    ))
                    .with_destination(DestinationDraft::new(
                        "Hamburg",
                        "Germany",
                        date!(2025 - 07 - 02),
                        date!(2025 - 07 - 03),
                    )),
            )
            .unwrap();
        store
            .add_expense(
                first.id,
                NewExpense::new(BudgetCategory::Meals, 120.5, date!(2025 - 06 - 02)),
            )
            .unwrap();
        store
            .add_expense(
                first.id,
                NewExpense::new(BudgetCategory::Transportation, 79.5, date!(2025 - 06 - 01)),
            )
            .unwrap();

        let insights = store.insights(10);

        assert_eq!(insights.total_trips, 2);
        assert_eq!(insights.total_days_traveled, 4 + 2);
        assert!((insights.total_spent - 200.0).abs() < f64::EPSILON);
        assert_eq!(insights.favorite_destinations[0].city, "Berlin");
        assert_eq!(insights.favorite_destinations[0].visits, 2);
    }

    #[tokio::test]
    async fn fetch_replaces_collection_and_clears_loading() {
        let seed = vec![];
        let backend = SimulatedBackend::default().with_trips(seed);
        let store = TripStore::new(Arc::new(backend));
        store
            .create_trip(make_draft("local-only", date!(2025 - 06 - 01), date!(2025 - 06 - 05)))
            .unwrap();

        store.fetch_trips().await.unwrap();

        assert!(store.trips().is_empty());
        assert!(!store.loading());
        assert!(store.last_error().is_none());
    }

    #[tokio::test]
    async fn failed_fetch_stores_message_verbatim() {
        let backend = SimulatedBackend::default().failing_with("backend unavailable");
        let store = TripStore::new(Arc::new(backend));

        let result = store.fetch_trips().await;

        assert!(matches!(result, Err(TripStoreError::Backend(_))));
        assert_eq!(store.last_error().as_deref(), Some("backend unavailable"));
        assert!(!store.loading());

        store.clear_error();
        assert!(store.last_error().is_none());
    }

    #[tokio::test]
    async fn next_successful_operation_clears_error_slot() {
        let backend = SimulatedBackend::default().failing_with("boom");
        let store = TripStore::new(Arc::new(backend));
        let _ = store.fetch_trips().await;
        assert!(store.last_error().is_some());

        store
            .create_trip(make_draft("Berlin", date!(2025 - 06 - 01), date!(2025 - 06 - 05)))
            .unwrap();

        assert!(store.last_error().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stale_fetch_result_is_discarded() {
        let slow_trip = {
            let staging = make_store();
            staging
                .create_trip(make_draft("slow", date!(2030 - 01 - 01), date!(2030 - 01 - 05)))
                .unwrap()
        };
        let fast_trip = {
            let staging = make_store();
            staging
                .create_trip(make_draft("fast", date!(2030 - 02 - 01), date!(2030 - 02 - 05)))
                .unwrap()
        };

        // One store, one backend whose payload and delay are swapped between
        // the two overlapping fetches.
        let backend = SimulatedBackend::default()
            .with_trips(vec![slow_trip])
            .with_delay(StdDuration::from_millis(200));
        let store = Arc::new(TripStore::new(Arc::new(backend.clone())));

        let slow = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.fetch_trips().await })
        };
        tokio::time::sleep(StdDuration::from_millis(50)).await;
        backend.set_trips(vec![fast_trip]);
        backend.set_delay(StdDuration::from_millis(0));
        store.fetch_trips().await.unwrap();

        slow.await.unwrap().unwrap();

        // The slow (first) fetch finished last but was stale; the newer
        // result must win.
        let titles: Vec<String> = store.trips().into_iter().map(|trip| trip.title).collect();
        assert_eq!(titles, vec!["fast".to_string()]);
    }
}
