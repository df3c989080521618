use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeStatus {
    pub completed: bool,
    pub progress: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Challenges {
    pub read_12_books_this_year: ChallengeStatus,
    pub read_3_books_by_same_author: ChallengeStatus,
    pub read_5000_pages: ChallengeStatus,
}

const YEARLY_BOOKS_TARGET: i64 = 12;
const SAME_AUTHOR_TARGET: i64 = 3;
const PAGES_TARGET: i64 = 5000;

/// Three independent reading challenges evaluated over the user's ledger.
pub fn reading_challenges(
    conn: &Connection,
    user_id: i64,
    current_year: i32,
) -> AppResult<Challenges> {
    // 1. Ledger rows in the current calendar year; repeat reads count.
    let books_this_year: i64 = conn.query_row(
        "SELECT COUNT(*)
         FROM has_read
         WHERE user_id = ?1 AND CAST(strftime('%Y', date) AS INTEGER) = ?2",
        params![user_id, current_year],
        |row| row.get(0),
    )?;

    // 2. Best per-author count of distinct read books.
    let same_author: i64 = conn.query_row(
        "SELECT COALESCE(MAX(cnt), 0) FROM (
             SELECT COUNT(DISTINCT hr.book_id) AS cnt
             FROM has_read hr
             JOIN written_by wb ON wb.book_id = hr.book_id
             WHERE hr.user_id = ?1
             GROUP BY wb.author_id
         )",
        params![user_id],
        |row| row.get(0),
    )?;

    // 3. Pages summed over distinct read books, so a re-read does not count
    // the same book twice. Books without a page length contribute 0.
    let total_pages: i64 = conn.query_row(
        "SELECT COALESCE(SUM(page_length), 0) FROM (
             SELECT DISTINCT b.book_id, b.page_length
             FROM has_read hr
             JOIN books b ON b.book_id = hr.book_id
             WHERE hr.user_id = ?1
         )",
        params![user_id],
        |row| row.get(0),
    )?;

    Ok(Challenges {
        read_12_books_this_year: ChallengeStatus {
            completed: books_this_year >= YEARLY_BOOKS_TARGET,
            progress: books_this_year,
        },
        read_3_books_by_same_author: ChallengeStatus {
            completed: same_author >= SAME_AUTHOR_TARGET,
            progress: same_author,
        },
        read_5000_pages: ChallengeStatus {
            completed: total_pages >= PAGES_TARGET,
            progress: total_pages,
        },
    })
}
