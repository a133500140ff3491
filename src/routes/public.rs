use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::{db::StoreStatus, state::AppState};

pub const WELCOME_MESSAGE: &str = "Welcome to the trips API!";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(landing))
        .route("/health", get(health))
}

#[derive(Serialize)]
struct Message {
    message: &'static str,
}

async fn landing() -> Json<Message> {
    Json(Message {
        message: WELCOME_MESSAGE,
    })
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<StoreStatus>) {
    let status = state.store_status.borrow().clone();
    let code = if status.is_connected() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}
