use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::social::{self, FollowCandidate};
use crate::state::AppState;

#[derive(Deserialize)]
struct FollowRequest {
    follower_id: i64,
    followee_id: i64,
}

#[derive(Deserialize)]
struct UserIdQuery {
    user_id: Option<String>,
}

#[derive(Deserialize)]
struct SearchQuery {
    query: Option<String>,
    current_user_id: Option<String>,
}

#[derive(Serialize)]
struct MessageResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Serialize)]
struct UsersResponse {
    status: &'static str,
    users: Vec<FollowCandidate>,
}

async fn follow(
    State(state): State<AppState>,
    Json(request): Json<FollowRequest>,
) -> AppResult<Json<MessageResponse>> {
    let conn = state.db.get()?;
    social::follow(&conn, request.follower_id, request.followee_id)?;
    tracing::info!(
        follower = request.follower_id,
        followee = request.followee_id,
        "Followed user"
    );
    Ok(Json(MessageResponse {
        status: "success",
        message: "Now following",
    }))
}

async fn unfollow(
    State(state): State<AppState>,
    Json(request): Json<FollowRequest>,
) -> AppResult<Json<MessageResponse>> {
    let conn = state.db.get()?;
    social::unfollow(&conn, request.follower_id, request.followee_id)?;
    Ok(Json(MessageResponse {
        status: "success",
        message: "Unfollowed",
    }))
}

async fn users_to_follow(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> AppResult<Json<UsersResponse>> {
    let user_id = query
        .user_id
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("user_id is required".into()))
        .and_then(super::parse_user_id)?;

    let conn = state.db.get()?;
    let users = social::users_to_follow(&conn, user_id)?;
    Ok(Json(UsersResponse {
        status: "success",
        users,
    }))
}

async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<UsersResponse>> {
    let current_user_id = query
        .current_user_id
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("current_user_id is required".into()))
        .and_then(super::parse_user_id)?;
    let needle = query.query.unwrap_or_default();

    let conn = state.db.get()?;
    let users = social::search_users(&conn, needle.trim(), current_user_id)?;
    Ok(Json(UsersResponse {
        status: "success",
        users,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/follow", post(follow))
        .route("/api/unfollow", post(unfollow))
        .route("/api/users-to-follow", get(users_to_follow))
        .route("/api/search-users", get(search_users))
}
