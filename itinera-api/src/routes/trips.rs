use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::Date;
use tracing::instrument;

use crate::{
    app_state::AppState,
    domain::models::{
        ContactId, Expense, MeetingId, NewExpense, TravelInsights, Trip, TripDraft, TripId,
        TripPatch,
    },
    routes::ApiError,
};

const INSIGHTS_TOP_N: usize = 5;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trips).post(create_trip))
        .route("/status", get(store_status))
        .route("/upcoming", get(upcoming_trips))
        .route("/range", get(trips_in_range))
        .route("/insights", get(insights))
        .route("/refresh", post(refresh))
        .route("/selected", get(selected_trip).put(select_trip))
        .route("/:id", get(get_trip).patch(update_trip).delete(delete_trip))
        .route("/:id/meetings", post(link_meeting))
        .route("/:id/contacts", post(link_contact))
        .route("/:id/expenses", post(add_expense))
}

#[instrument(name = "list_trips", skip(app_state))]
async fn list_trips(State(app_state): State<AppState>) -> Json<Vec<Trip>> {
    Json(app_state.trip_store.trips())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StoreStatusResponse {
    loading: bool,
    error: Option<String>,
}

#[instrument(name = "store_status", skip(app_state))]
async fn store_status(State(app_state): State<AppState>) -> Json<StoreStatusResponse> {
    Json(StoreStatusResponse {
        loading: app_state.trip_store.loading(),
        error: app_state.trip_store.last_error(),
    })
}

#[instrument(name = "create_trip", skip(app_state, draft))]
async fn create_trip(
    State(app_state): State<AppState>,
    Json(draft): Json<TripDraft>,
) -> Result<(StatusCode, Json<Trip>), ApiError> {
    let trip = app_state.trip_store.create_trip(draft)?;
    Ok((StatusCode::CREATED, Json(trip)))
}

#[instrument(name = "get_trip", skip(app_state))]
async fn get_trip(
    State(app_state): State<AppState>,
    Path(id): Path<TripId>,
) -> Result<Json<Trip>, ApiError> {
    app_state
        .trip_store
        .trip(id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("trip not found: {id}")))
}

#[instrument(name = "update_trip", skip(app_state, patch))]
async fn update_trip(
    State(app_state): State<AppState>,
    Path(id): Path<TripId>,
    Json(patch): Json<TripPatch>,
) -> Result<Json<Trip>, ApiError> {
    let trip = app_state.trip_store.update_trip(id, patch)?;
    Ok(Json(trip))
}

#[instrument(name = "delete_trip", skip(app_state))]
async fn delete_trip(
    State(app_state): State<AppState>,
    Path(id): Path<TripId>,
) -> Result<StatusCode, ApiError> {
    app_state.trip_store.delete_trip(id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "upcoming_trips", skip(app_state))]
async fn upcoming_trips(State(app_state): State<AppState>) -> Json<Vec<Trip>> {
    Json(app_state.trip_store.upcoming_trips())
}

#[derive(Debug, Deserialize)]
struct RangeQuery {
    start: Date,
    end: Date,
}

#[instrument(name = "trips_in_range", skip(app_state))]
async fn trips_in_range(
    State(app_state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> Json<Vec<Trip>> {
    Json(app_state.trip_store.trips_in_range(range.start, range.end))
}

#[instrument(name = "insights", skip(app_state))]
async fn insights(State(app_state): State<AppState>) -> Json<TravelInsights> {
    Json(app_state.trip_store.insights(INSIGHTS_TOP_N))
}

#[instrument(name = "refresh_trips", skip(app_state))]
async fn refresh(State(app_state): State<AppState>) -> Result<StatusCode, ApiError> {
    app_state.trip_store.fetch_trips().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectTripPayload {
    trip_id: Option<TripId>,
}

#[instrument(name = "select_trip", skip(app_state))]
async fn select_trip(
    State(app_state): State<AppState>,
    Json(body): Json<SelectTripPayload>,
) -> StatusCode {
    app_state.trip_store.select_trip(body.trip_id);
    StatusCode::NO_CONTENT
}

#[instrument(name = "selected_trip", skip(app_state))]
async fn selected_trip(State(app_state): State<AppState>) -> Json<Option<Trip>> {
    Json(app_state.trip_store.selected_trip())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkMeetingPayload {
    meeting_id: MeetingId,
}

#[instrument(name = "link_meeting", skip(app_state))]
async fn link_meeting(
    State(app_state): State<AppState>,
    Path(id): Path<TripId>,
    Json(body): Json<LinkMeetingPayload>,
) -> Result<StatusCode, ApiError> {
    app_state.trip_store.link_meeting(id, body.meeting_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkContactPayload {
    contact_id: ContactId,
}

#[instrument(name = "link_contact", skip(app_state))]
async fn link_contact(
    State(app_state): State<AppState>,
    Path(id): Path<TripId>,
    Json(body): Json<LinkContactPayload>,
) -> Result<StatusCode, ApiError> {
    app_state.trip_store.link_contact(id, body.contact_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(name = "add_expense", skip(app_state, body))]
async fn add_expense(
    State(app_state): State<AppState>,
    Path(id): Path<TripId>,
    Json(body): Json<NewExpense>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let expense = app_state.trip_store.add_expense(id, body)?;
    Ok((StatusCode::CREATED, Json(expense)))
}
