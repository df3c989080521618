use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::feed::{self, FeedItem, FEED_ALL_DEFAULT_LIMIT, HISTORY_DEFAULT_LIMIT};
use crate::state::AppState;

#[derive(Deserialize)]
struct FeedQuery {
    user_id: Option<String>,
    limit: Option<String>,
}

#[derive(Deserialize)]
struct HistoryQuery {
    current_user_id: Option<String>,
    limit: Option<String>,
}

fn parse_limit(raw: &Option<String>, default: i64) -> AppResult<i64> {
    match raw.as_deref() {
        Some(raw) => super::parse_param(raw, "limit"),
        None => Ok(default),
    }
}

#[derive(Serialize)]
struct FeedResponse {
    status: &'static str,
    feed: Vec<FeedItem>,
}

#[derive(Serialize)]
struct HistoryResponse {
    status: &'static str,
    reading_history: Vec<FeedItem>,
}

/// Latest read per followed user, newest activity first.
async fn feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<FeedResponse>> {
    let user_id = query
        .user_id
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("user_id is required".into()))
        .and_then(super::parse_user_id)?;

    let conn = state.db.get()?;
    let items = feed::feed(&conn, user_id)?;
    Ok(Json(FeedResponse {
        status: "success",
        feed: items,
    }))
}

/// Every followee read, not just each followee's latest.
async fn feed_all(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<FeedResponse>> {
    let user_id = query
        .user_id
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("user_id is required".into()))
        .and_then(super::parse_user_id)?;
    let limit = parse_limit(&query.limit, FEED_ALL_DEFAULT_LIMIT)?;

    let conn = state.db.get()?;
    let items = feed::feed_all(&conn, user_id, limit)?;
    Ok(Json(FeedResponse {
        status: "success",
        feed: items,
    }))
}

/// One user's reading history; 403 unless the viewer is that user or
/// follows them.
async fn feed_user(
    State(state): State<AppState>,
    Path(target_user_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<HistoryResponse>> {
    let current_user_id = query
        .current_user_id
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("current_user_id is required".into()))
        .and_then(super::parse_user_id)?;
    let limit = parse_limit(&query.limit, HISTORY_DEFAULT_LIMIT)?;

    let conn = state.db.get()?;
    let items = feed::feed_user(&conn, current_user_id, target_user_id, limit)?;
    Ok(Json(HistoryResponse {
        status: "success",
        reading_history: items,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/feed", get(feed))
        .route("/api/feed/all", get(feed_all))
        .route("/api/feed/user/{target_user_id}", get(feed_user))
}
