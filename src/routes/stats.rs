use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::stats::{self, Challenges, MostReadBook, ReadingStats, WeeklyReads};

#[derive(Deserialize)]
struct UserIdQuery {
    user_id: Option<String>,
}

#[derive(Deserialize)]
struct UsernameQuery {
    // Carries a user id; the original frontend sends it under this name.
    username: Option<String>,
}

#[derive(Deserialize)]
struct YearQuery {
    year: Option<String>,
}

#[derive(Serialize)]
struct MostReadBookResponse {
    book: Option<MostReadBook>,
    year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Serialize)]
struct AvailableYearsResponse {
    years: Vec<i32>,
}

#[derive(Serialize)]
struct ChallengesResponse {
    status: &'static str,
    challenges: Challenges,
}

async fn reading_stats(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> AppResult<Json<ReadingStats>> {
    let user_id = query
        .user_id
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("user_id is required".into()))
        .and_then(super::parse_user_id)?;

    let conn = state.db.get()?;
    let stats = stats::reading_stats(&conn, user_id)?;
    Ok(Json(stats))
}

async fn author_stats(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> AppResult<Json<Vec<stats::AuthorStats>>> {
    let user_id = query
        .username
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("username is required".into()))
        .and_then(super::parse_user_id)?;

    let conn = state.db.get()?;
    let stats = stats::author_stats(&conn, user_id)?;
    Ok(Json(stats))
}

async fn most_read_book(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> AppResult<Json<MostReadBookResponse>> {
    let year: i32 = query
        .year
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("year is required".into()))
        .and_then(|raw| super::parse_param(raw, "year"))?;

    let conn = state.db.get()?;
    let book = stats::most_read_book(&conn, year)?;
    let message = book
        .is_none()
        .then(|| format!("No books were read in {year}"));
    Ok(Json(MostReadBookResponse { book, year, message }))
}

async fn available_years(
    State(state): State<AppState>,
) -> AppResult<Json<AvailableYearsResponse>> {
    let conn = state.db.get()?;
    let years = stats::available_years(&conn, Utc::now().year())?;
    Ok(Json(AvailableYearsResponse { years }))
}

async fn weekly_reads(State(state): State<AppState>) -> AppResult<Json<WeeklyReads>> {
    let conn = state.db.get()?;
    // UTC reference date, never server-local time
    let week = stats::weekly_reads(&conn, Utc::now().date_naive())?;
    Ok(Json(week))
}

async fn reading_challenges(
    State(state): State<AppState>,
    Query(query): Query<UserIdQuery>,
) -> AppResult<Json<ChallengesResponse>> {
    let user_id = query
        .user_id
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("user_id is required".into()))
        .and_then(super::parse_user_id)?;

    let conn = state.db.get()?;
    let challenges = stats::reading_challenges(&conn, user_id, Utc::now().year())?;
    Ok(Json(ChallengesResponse {
        status: "success",
        challenges,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/reading-stats", get(reading_stats))
        .route("/api/author-stats", get(author_stats))
        .route("/api/most-read-book", get(most_read_book))
        .route("/api/most-read-book/available-years", get(available_years))
        .route("/api/admin/analytics/weekly-reads", get(weekly_reads))
        .route("/api/reading_challenges", get(reading_challenges))
}
