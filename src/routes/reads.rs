use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::ledger::{self, ReadBook};
use crate::state::AppState;

#[derive(Deserialize)]
struct UsernameQuery {
    username: Option<String>,
}

#[derive(Deserialize)]
struct MarkAsReadRequest {
    book_id: i64,
    review: Option<String>,
}

#[derive(Deserialize)]
struct ReviewRequest {
    user_id: Option<String>,
    book_id: i64,
    review: String,
}

#[derive(Serialize)]
struct MarkAsReadResponse {
    status: &'static str,
    message: &'static str,
    hasread_id: i64,
}

#[derive(Serialize)]
struct ReadsResponse {
    status: &'static str,
    books: Vec<ReadBook>,
}

#[derive(Serialize)]
struct MessageResponse {
    status: &'static str,
    message: &'static str,
}

/// Append a ledger entry dated today (UTC).
async fn mark_as_read(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
    Json(request): Json<MarkAsReadRequest>,
) -> AppResult<(StatusCode, Json<MarkAsReadResponse>)> {
    let user_id = query
        .username
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("username is required".into()))
        .and_then(super::parse_user_id)?;

    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let review = request.review.as_deref().filter(|r| !r.trim().is_empty());

    let conn = state.db.get()?;
    let hasread_id = ledger::append_read(&conn, user_id, request.book_id, &today, review)?;
    tracing::info!(user_id, book_id = request.book_id, "Marked book as read");

    Ok((
        StatusCode::CREATED,
        Json(MarkAsReadResponse {
            status: "success",
            message: "Book marked as read",
            hasread_id,
        }),
    ))
}

async fn list_reads(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> AppResult<Json<ReadsResponse>> {
    let user_id = query
        .username
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("username is required".into()))
        .and_then(super::parse_user_id)?;

    let conn = state.db.get()?;
    let books = ledger::list_reads_by_user(&conn, user_id)?;
    Ok(Json(ReadsResponse {
        status: "success",
        books,
    }))
}

async fn update_review(
    State(state): State<AppState>,
    Json(request): Json<ReviewRequest>,
) -> AppResult<Json<MessageResponse>> {
    let user_id = request
        .user_id
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("user_id is required".into()))
        .and_then(super::parse_user_id)?;

    let conn = state.db.get()?;
    ledger::update_review(&conn, user_id, request.book_id, &request.review)?;
    Ok(Json(MessageResponse {
        status: "success",
        message: "Review updated",
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/mark-as-read", post(mark_as_read))
        .route("/api/hasread", get(list_reads))
        .route("/api/hasread/review", put(update_review))
}
