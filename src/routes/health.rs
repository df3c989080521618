use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    database: &'static str,
}

/// Liveness check that also pings the database.
async fn health(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let conn = state.db.get()?;
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;

    Ok(Json(HealthResponse {
        status: "healthy",
        message: "Server is running",
        database: "SQLite",
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}
