use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    app_state::AppState,
    domain::models::{
        filter_items, group_by_category, sort_items, ChecklistCategory, ChecklistFilter,
        ChecklistItem, ChecklistItemId, ChecklistItemPatch, ChecklistSortKey, CompletionFilter,
        NewChecklistItem, TripId,
    },
    routes::ApiError,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/checklist", get(checklist_view).post(add_item))
        .route(
            "/:id/checklist/:item_id",
            axum::routing::patch(update_item).delete(remove_item),
        )
        .route("/:id/checklist/:item_id/completed", put(set_completed))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChecklistViewQuery {
    category: Option<ChecklistCategory>,
    #[serde(default)]
    completion: CompletionFilter,
    #[serde(default)]
    sort: ChecklistSortKey,
    #[serde(default)]
    grouped: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryGroup {
    category: ChecklistCategory,
    items: Vec<ChecklistItem>,
}

/// The filtered/sorted checklist plus every time-relative rollup the
/// presentation layer renders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChecklistViewResponse {
    progress: f64,
    items: Vec<ChecklistItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    groups: Option<Vec<CategoryGroup>>,
    overdue: Vec<ChecklistItem>,
    due_soon: Vec<ChecklistItem>,
}

#[instrument(name = "checklist_view", skip(app_state))]
async fn checklist_view(
    State(app_state): State<AppState>,
    Path(id): Path<TripId>,
    Query(query): Query<ChecklistViewQuery>,
) -> Result<Json<ChecklistViewResponse>, ApiError> {
    let trip = app_state
        .trip_store
        .trip(id)
        .ok_or_else(|| ApiError::not_found(format!("trip not found: {id}")))?;

    let filter = ChecklistFilter {
        category: query.category,
        completion: query.completion,
    };
    let mut items = filter_items(&trip.checklist, &filter);
    sort_items(&mut items, query.sort);

    let groups = query.grouped.then(|| {
        group_by_category(items.clone())
            .into_iter()
            .map(|(category, items)| CategoryGroup { category, items })
            .collect()
    });

    let now = OffsetDateTime::now_utc();
    Ok(Json(ChecklistViewResponse {
        progress: trip.progress(),
        items,
        groups,
        overdue: trip.overdue_tasks(now).into_iter().cloned().collect(),
        due_soon: trip.due_soon_tasks(now).into_iter().cloned().collect(),
    }))
}

#[instrument(name = "add_checklist_item", skip(app_state, body))]
async fn add_item(
    State(app_state): State<AppState>,
    Path(id): Path<TripId>,
    Json(body): Json<NewChecklistItem>,
) -> Result<(StatusCode, Json<ChecklistItem>), ApiError> {
    let item = app_state.trip_store.add_checklist_item(id, body)?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(name = "update_checklist_item", skip(app_state, patch))]
async fn update_item(
    State(app_state): State<AppState>,
    Path((id, item_id)): Path<(TripId, ChecklistItemId)>,
    Json(patch): Json<ChecklistItemPatch>,
) -> Result<Json<ChecklistItem>, ApiError> {
    let item = app_state
        .trip_store
        .update_checklist_item(id, item_id, patch)?;
    Ok(Json(item))
}

#[instrument(name = "remove_checklist_item", skip(app_state))]
async fn remove_item(
    State(app_state): State<AppState>,
    Path((id, item_id)): Path<(TripId, ChecklistItemId)>,
) -> Result<StatusCode, ApiError> {
    app_state.trip_store.remove_checklist_item(id, item_id)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetCompletedPayload {
    completed: bool,
}

#[instrument(name = "set_checklist_item_completed", skip(app_state))]
async fn set_completed(
    State(app_state): State<AppState>,
    Path((id, item_id)): Path<(TripId, ChecklistItemId)>,
    Json(body): Json<SetCompletedPayload>,
) -> Result<Json<ChecklistItem>, ApiError> {
    let item = app_state
        .trip_store
        .set_checklist_item_completed(id, item_id, body.completed)?;
    Ok(Json(item))
}
