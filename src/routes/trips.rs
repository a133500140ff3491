use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use crate::{error::AppError, extract::JsonBody, models::trip::Trip, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/trips", get(list_trips).post(create_trip))
        .route("/api/trips/:id", put(update_trip))
}

async fn create_trip(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<Trip>), AppError> {
    state.ensure_store_started()?;
    let trip = state.trips.create(body).await?;
    Ok((StatusCode::CREATED, Json(trip)))
}

async fn list_trips(State(state): State<AppState>) -> Result<Json<Vec<Trip>>, AppError> {
    state.ensure_store_started()?;
    Ok(Json(state.trips.list().await?))
}

async fn update_trip(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<Trip>, AppError> {
    state.ensure_store_started()?;
    Ok(Json(state.trips.update(&id, body).await?))
}
