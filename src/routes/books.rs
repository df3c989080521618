use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::catalog::{self, BookListing, NewBook, SortDir};
use crate::error::{AppError, AppResult};
use crate::ledger;
use crate::state::AppState;

#[derive(Deserialize)]
struct LogBookRequest {
    title: String,
    issue: Option<String>,
    page_length: Option<i64>,
    cover_url: Option<String>,
    author: String,
    author_dob: Option<String>,
    publisher: String,
    user_id: Option<String>,
}

#[derive(Deserialize)]
struct SearchQuery {
    query: Option<String>,
    sort: Option<String>,
    username: Option<String>,
}

#[derive(Deserialize)]
struct PageRangeQuery {
    min: Option<String>,
    max: Option<String>,
    username: Option<String>,
}

#[derive(Deserialize)]
struct ByUserRequest {
    username: String,
}

#[derive(Deserialize)]
struct ByLetterRequest {
    letter: String,
    username: String,
}

#[derive(Deserialize)]
struct StarRequest {
    user_id: Option<String>,
    book_id: i64,
    starred: Option<bool>,
}

#[derive(Serialize)]
struct LogBookResponse {
    status: &'static str,
    message: &'static str,
    book_id: i64,
    author_id: i64,
    publisher_id: i64,
}

#[derive(Serialize)]
struct BooksResponse {
    status: &'static str,
    books: Vec<BookListing>,
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
}

fn required_user(raw: &Option<String>, param: &str) -> AppResult<i64> {
    raw.as_deref()
        .ok_or_else(|| AppError::BadRequest(format!("{param} is required")))
        .and_then(super::parse_user_id)
}

async fn log_book(
    State(state): State<AppState>,
    Json(request): Json<LogBookRequest>,
) -> AppResult<(StatusCode, Json<LogBookResponse>)> {
    if request.title.trim().is_empty()
        || request.author.trim().is_empty()
        || request.publisher.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "Title, author, and publisher are required".into(),
        ));
    }
    let user_id = required_user(&request.user_id, "user_id")?;

    let new_book = NewBook {
        title: request.title,
        issue: request.issue,
        page_length: request.page_length,
        cover_url: request.cover_url,
        author: request.author,
        author_dob: request.author_dob,
        publisher: request.publisher,
    };

    let conn = state.db.get()?;
    let logged = catalog::log_book(&conn, user_id, &new_book)?;
    tracing::info!(book_id = logged.book_id, user_id, "Logged book");

    Ok((
        StatusCode::CREATED,
        Json(LogBookResponse {
            status: "success",
            message: "Book, author, and publisher saved",
            book_id: logged.book_id,
            author_id: logged.author_id,
            publisher_id: logged.publisher_id,
        }),
    ))
}

async fn search_books(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<BooksResponse>> {
    let user_id = required_user(&query.username, "username")?;
    let needle = query.query.unwrap_or_default();

    let conn = state.db.get()?;
    let books = catalog::search_books(&conn, user_id, needle.trim())?;
    Ok(Json(BooksResponse {
        status: "success",
        books,
    }))
}

async fn sort_books(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<BooksResponse>> {
    let user_id = required_user(&query.username, "username")?;
    let needle = query.query.unwrap_or_default();
    let dir = query.sort.as_deref().map(SortDir::parse).unwrap_or_default();

    let conn = state.db.get()?;
    let books = catalog::sort_books(&conn, user_id, needle.trim(), dir)?;
    Ok(Json(BooksResponse {
        status: "success",
        books,
    }))
}

async fn page_range(
    State(state): State<AppState>,
    Query(query): Query<PageRangeQuery>,
) -> AppResult<Json<BooksResponse>> {
    let user_id = required_user(&query.username, "username")?;
    let min: i64 = query
        .min
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("min is required".into()))
        .and_then(|raw| super::parse_param(raw, "min"))?;
    let max: i64 = query
        .max
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("max is required".into()))
        .and_then(|raw| super::parse_param(raw, "max"))?;

    let conn = state.db.get()?;
    let books = catalog::books_in_page_range(&conn, user_id, min, max)?;
    Ok(Json(BooksResponse {
        status: "success",
        books,
    }))
}

async fn all_books_by_user(
    State(state): State<AppState>,
    Json(request): Json<ByUserRequest>,
) -> AppResult<Json<BooksResponse>> {
    let user_id = super::parse_user_id(&request.username)?;

    let conn = state.db.get()?;
    let books = catalog::list_books_by_user(&conn, user_id)?;
    Ok(Json(BooksResponse {
        status: "success",
        books,
    }))
}

async fn books_by_letter(
    State(state): State<AppState>,
    Json(request): Json<ByLetterRequest>,
) -> AppResult<Json<BooksResponse>> {
    let user_id = super::parse_user_id(&request.username)?;
    if request.letter.chars().count() != 1 {
        return Err(AppError::BadRequest("letter must be a single character".into()));
    }

    let conn = state.db.get()?;
    let books = catalog::books_by_letter(&conn, user_id, &request.letter)?;
    Ok(Json(BooksResponse {
        status: "success",
        books,
    }))
}

async fn star(
    State(state): State<AppState>,
    Json(request): Json<StarRequest>,
) -> AppResult<Json<StatusResponse>> {
    let user_id = required_user(&request.user_id, "user_id")?;
    let starred = request.starred.unwrap_or(true);

    let conn = state.db.get()?;
    ledger::set_star(&conn, user_id, request.book_id, starred)?;
    Ok(Json(StatusResponse { status: "success" }))
}

async fn unstar(
    State(state): State<AppState>,
    Json(request): Json<StarRequest>,
) -> AppResult<Json<StatusResponse>> {
    let user_id = required_user(&request.user_id, "user_id")?;

    let conn = state.db.get()?;
    ledger::unstar(&conn, user_id, request.book_id)?;
    Ok(Json(StatusResponse { status: "success" }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/books", post(log_book))
        .route("/api/books/search", get(search_books))
        .route("/api/books/sort", get(sort_books))
        .route("/api/books/page-range", get(page_range))
        .route("/api/get_all_books_by_user", post(all_books_by_user))
        .route("/api/filter_books_by_letter", post(books_by_letter))
        .route("/api/star", post(star))
        .route("/api/unstar", delete(unstar))
}
