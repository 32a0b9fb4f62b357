use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::TripStoreError;

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl From<TripStoreError> for ApiError {
    fn from(err: TripStoreError) -> Self {
        let status = match &err {
            TripStoreError::InvalidDateRange { .. } => StatusCode::BAD_REQUEST,
            TripStoreError::TripNotFound(_) | TripStoreError::ChecklistItemNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            TripStoreError::Backend(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
