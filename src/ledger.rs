// Reading ledger - append-only has_read rows plus the per-user star flags.

use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// A ledger row joined with its book, as served by the history endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ReadBook {
    pub book_id: i64,
    pub title: String,
    pub issue: Option<String>,
    pub page_length: Option<i64>,
    pub review: Option<String>,
    pub date: String,
    pub hasread_id: i64,
}

/// Append a read event. The ledger is append-only; re-reading a book adds a
/// new row rather than touching the old one.
pub fn append_read(
    conn: &Connection,
    user_id: i64,
    book_id: i64,
    date: &str,
    review: Option<&str>,
) -> AppResult<i64> {
    let user_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE user_id = ?1)",
        params![user_id],
        |row| row.get(0),
    )?;
    if !user_exists {
        return Err(AppError::NotFound("User not found".into()));
    }

    let book_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM books WHERE book_id = ?1)",
        params![book_id],
        |row| row.get(0),
    )?;
    if !book_exists {
        return Err(AppError::NotFound("Book not found".into()));
    }

    conn.execute(
        "INSERT INTO has_read (user_id, book_id, date, review) VALUES (?1, ?2, ?3, ?4)",
        params![user_id, book_id, date, review],
    )?;
    Ok(conn.last_insert_rowid())
}

/// All reads by one user, newest first.
pub fn list_reads_by_user(conn: &Connection, user_id: i64) -> AppResult<Vec<ReadBook>> {
    let mut stmt = conn.prepare(
        "SELECT hr.book_id, b.title, b.issue, b.page_length, hr.review, hr.date, hr.hasread_id
         FROM has_read hr
         JOIN books b ON b.book_id = hr.book_id
         WHERE hr.user_id = ?1
         ORDER BY hr.date DESC, hr.hasread_id DESC",
    )?;
    let reads = stmt
        .query_map(params![user_id], |row| {
            Ok(ReadBook {
                book_id: row.get(0)?,
                title: row.get(1)?,
                issue: row.get(2)?,
                page_length: row.get(3)?,
                review: row.get(4)?,
                date: row.get(5)?,
                hasread_id: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(reads)
}

/// Replace the review on the most recent read of a book. Older reads keep
/// their reviews.
pub fn update_review(
    conn: &Connection,
    user_id: i64,
    book_id: i64,
    review: &str,
) -> AppResult<()> {
    let rows = conn.execute(
        "UPDATE has_read SET review = ?1
         WHERE hasread_id = (
             SELECT MAX(hasread_id) FROM has_read WHERE user_id = ?2 AND book_id = ?3
         )",
        params![review, user_id, book_id],
    )?;
    if rows == 0 {
        return Err(AppError::NotFound("No read entry for this book".into()));
    }
    Ok(())
}

/// Star or unstar a book for a user. Upsert keyed on (user_id, book_id), so
/// concurrent writers cannot produce duplicate rows.
pub fn set_star(conn: &Connection, user_id: i64, book_id: i64, starred: bool) -> AppResult<()> {
    conn.execute(
        "INSERT INTO starred (user_id, book_id, starred) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id, book_id) DO UPDATE SET starred = excluded.starred",
        params![user_id, book_id, starred],
    )?;
    Ok(())
}

/// Remove a star. Idempotent: unstarring a book that was never starred is
/// not an error.
pub fn unstar(conn: &Connection, user_id: i64, book_id: i64) -> AppResult<()> {
    conn.execute(
        "DELETE FROM starred WHERE user_id = ?1 AND book_id = ?2",
        params![user_id, book_id],
    )?;
    Ok(())
}
