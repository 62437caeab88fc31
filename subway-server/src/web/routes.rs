//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::{ChainError, LineId, StationId};
use crate::service::ServiceError;
use crate::stations::StationError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stations", get(list_stations).post(create_station))
        .route(
            "/stations/:id",
            get(get_station).put(rename_station).delete(delete_station),
        )
        .route("/lines", get(list_lines).post(create_line))
        .route(
            "/lines/:id",
            get(get_line).put(update_line).delete(delete_line),
        )
        .route(
            "/lines/:id/sections",
            get(list_sections).post(add_section).delete(remove_section),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn create_station(
    State(state): State<AppState>,
    Json(req): Json<StationRequest>,
) -> Result<Response, AppError> {
    let station = state.stations.create(&req.name).await?;
    let location = format!("/stations/{}", station.id());
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(StationResponse::from(&station)),
    )
        .into_response())
}

async fn list_stations(State(state): State<AppState>) -> Json<Vec<StationResponse>> {
    let stations = state.stations.list().await;
    Json(stations.iter().map(StationResponse::from).collect())
}

async fn get_station(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<StationResponse>, AppError> {
    let station = state.stations.get(StationId(id)).await?;
    Ok(Json(StationResponse::from(&station)))
}

/// Rename a station. Lines through it pick up the new name.
async fn rename_station(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<StationRequest>,
) -> Result<Json<StationResponse>, AppError> {
    let station = state
        .lines
        .rename_station(state.stations.rename(StationId(id), &req.name))
        .await?;
    Ok(Json(StationResponse::from(&station)))
}

/// Delete a station. Refused while any line still runs through it.
async fn delete_station(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    let id = StationId(id);
    state.stations.get(id).await?;
    state.lines.ensure_station_unused(id).await?;
    state.stations.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_line(
    State(state): State<AppState>,
    Json(req): Json<LineRequest>,
) -> Result<Response, AppError> {
    let line = state
        .lines
        .create_line(
            &req.name,
            &req.color,
            StationId(req.up_station_id),
            StationId(req.down_station_id),
            req.distance,
        )
        .await?;
    let location = format!("/lines/{}", line.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(LineResponse::from_snapshot(&line)),
    )
        .into_response())
}

async fn list_lines(State(state): State<AppState>) -> Result<Json<Vec<LineResponse>>, AppError> {
    let lines = state.lines.list_lines().await?;
    Ok(Json(
        lines.iter().map(|l| LineResponse::from_snapshot(l)).collect(),
    ))
}

async fn get_line(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<LineResponse>, AppError> {
    let line = state.lines.snapshot(LineId(id)).await?;
    Ok(Json(LineResponse::from_snapshot(&line)))
}

async fn update_line(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<LineUpdateRequest>,
) -> Result<Json<LineResponse>, AppError> {
    let line = state
        .lines
        .update_line(LineId(id), req.name.as_deref(), req.color.as_deref())
        .await?;
    Ok(Json(LineResponse::from_snapshot(&line)))
}

async fn delete_line(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    state.lines.delete_line(LineId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_sections(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Vec<SectionResponse>>, AppError> {
    let line = state.lines.snapshot(LineId(id)).await?;
    Ok(Json(SectionResponse::list(&line)))
}

async fn add_section(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<SectionRequest>,
) -> Result<Json<LineResponse>, AppError> {
    let line = state
        .lines
        .add_station(
            LineId(id),
            StationId(req.up_station_id),
            StationId(req.down_station_id),
            req.distance,
        )
        .await?;
    Ok(Json(LineResponse::from_snapshot(&line)))
}

async fn remove_section(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(query): Query<RemoveSectionQuery>,
) -> Result<Json<LineResponse>, AppError> {
    let line = state
        .lines
        .remove_station(LineId(id), StationId(query.station_id))
        .await?;
    Ok(Json(LineResponse::from_snapshot(&line)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Conflict { message: String },
    Internal { message: String },
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        let message = e.to_string();
        match e {
            ServiceError::Chain(ChainError::Inconsistent(_)) | ServiceError::Store(_) => {
                AppError::Internal { message }
            }
            ServiceError::Chain(_)
            | ServiceError::EmptyLineName
            | ServiceError::DuplicateLineName(_) => AppError::BadRequest { message },
            ServiceError::LineNotFound(_) => AppError::NotFound { message },
            // Referenced from a request body, so the request itself is wrong
            ServiceError::StationNotFound(_) => AppError::BadRequest { message },
            ServiceError::StationInUse { .. } => AppError::Conflict { message },
            ServiceError::Station(e) => AppError::from(e),
        }
    }
}

impl From<StationError> for AppError {
    fn from(e: StationError) -> Self {
        let message = e.to_string();
        match e {
            StationError::NotFound(_) => AppError::NotFound { message },
            StationError::EmptyName | StationError::DuplicateName(_) => {
                AppError::BadRequest { message }
            }
            StationError::Store(_) => AppError::Internal { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
