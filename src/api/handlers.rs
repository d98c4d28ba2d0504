//! HTTP endpoint handlers.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::api::server::ApiState;
use crate::api::types::{AllIposResponse, CategoryResponse, ErrorResponse, HomeResponse};
use crate::diagnostics::LogSink;
use crate::error::AppError;

/// Error wrapper that renders as `{success: false, error}` with status 500.
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        log::error!("Request failed: {}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(self.0.to_string())),
        )
            .into_response()
    }
}

/// Service description - GET /
pub async fn home() -> Json<HomeResponse> {
    Json(HomeResponse::default())
}

/// Current and upcoming IPOs - GET /api/ipos
pub async fn all_ipos(State(state): State<ApiState>) -> Result<Json<AllIposResponse>, ApiError> {
    let sink = LogSink;
    let current = state.aggregator.current(&sink).await?;
    let upcoming = state.aggregator.upcoming(&sink).await?;

    log::info!(
        "GET /api/ipos -> {} current, {} upcoming",
        current.records.len(),
        upcoming.records.len()
    );
    Ok(Json(AllIposResponse::from_outcomes(current, upcoming)))
}

/// Open IPOs - GET /api/ipos/current
pub async fn current_ipos(
    State(state): State<ApiState>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let outcome = state.aggregator.current(&LogSink).await?;
    log::info!("GET /api/ipos/current -> {}", outcome.records.len());
    Ok(Json(CategoryResponse::from_outcome(outcome)))
}

/// Upcoming IPOs - GET /api/ipos/upcoming
pub async fn upcoming_ipos(
    State(state): State<ApiState>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let outcome = state.aggregator.upcoming(&LogSink).await?;
    log::info!("GET /api/ipos/upcoming -> {}", outcome.records.len());
    Ok(Json(CategoryResponse::from_outcome(outcome)))
}

/// JSON 404 for unknown paths.
pub async fn not_found(uri: Uri) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new(format!("Not found: {}", uri.path()))),
    )
}
