use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::models::User;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::users;

#[derive(Deserialize)]
struct RegisterRequest {
    name: String,
    age: Option<i64>,
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
struct RegisterResponse {
    status: &'static str,
    message: &'static str,
    user_id: i64,
}

#[derive(Serialize)]
struct LoginResponse {
    status: &'static str,
    user_id: i64,
    username: String,
    name: String,
}

#[derive(Serialize)]
struct UsersResponse {
    status: &'static str,
    users: Vec<User>,
    count: usize,
}

#[derive(Serialize)]
struct UserResponse {
    status: &'static str,
    user: User,
}

#[derive(Serialize)]
struct MessageResponse {
    status: &'static str,
    message: String,
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required".into(),
        ));
    }

    let conn = state.db.get()?;
    let user_id = users::create_user(
        &conn,
        request.username.trim(),
        &request.name,
        request.age,
        &request.password,
    )?;
    tracing::info!(user_id, "Registered user");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            status: "success",
            message: "User registered",
            user_id,
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let conn = state.db.get()?;
    let user = users::verify_login(&conn, &request.username, &request.password)?;

    Ok(Json(LoginResponse {
        status: "success",
        user_id: user.user_id,
        username: user.username,
        name: user.name,
    }))
}

async fn get_users(State(state): State<AppState>) -> AppResult<Json<UsersResponse>> {
    let conn = state.db.get()?;
    let users = users::list_users(&conn)?;
    let count = users.len();
    Ok(Json(UsersResponse {
        status: "success",
        users,
        count,
    }))
}

async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<UserResponse>> {
    let conn = state.db.get()?;
    let user = users::get_user(&conn, user_id)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(UserResponse {
        status: "success",
        user,
    }))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    let conn = state.db.get()?;
    users::delete_user(&conn, user_id)?;
    tracing::info!(user_id, "Deleted user");
    Ok(Json(MessageResponse {
        status: "success",
        message: format!("User {user_id} deleted"),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/users", get(get_users))
        .route("/api/users/{user_id}", get(get_user))
        .route("/api/admin/users/{user_id}", delete(delete_user))
}
