use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::error::AppResult;

/// One row of the per-author breakdown over the books a user has logged.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorStats {
    pub author_name: String,
    pub num_books: i64,
    pub avg_page_length: Option<f64>,
    pub min_book_title: String,
    pub min_page_length: Option<i64>,
    pub max_book_title: String,
    pub max_page_length: Option<i64>,
}

/// Top authors among the books the user has logged (owned, not necessarily
/// read), ranked by book count. Capped at 10 rows; author_id breaks ties.
pub fn author_stats(conn: &Connection, user_id: i64) -> AppResult<Vec<AuthorStats>> {
    let mut stmt = conn.prepare(
        "SELECT a.author_id, a.name, COUNT(b.book_id) AS num_books,
                ROUND(AVG(b.page_length), 1), MIN(b.page_length), MAX(b.page_length)
         FROM books b
         JOIN written_by wb ON wb.book_id = b.book_id
         JOIN authors a ON a.author_id = wb.author_id
         WHERE b.user_id = ?1
         GROUP BY a.author_id
         ORDER BY num_books DESC, a.author_id ASC
         LIMIT 10",
    )?;

    let rows: Vec<(i64, String, i64, Option<f64>, Option<i64>, Option<i64>)> = stmt
        .query_map(params![user_id], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stats = Vec::with_capacity(rows.len());
    for (author_id, author_name, num_books, avg, min_pages, max_pages) in rows {
        let min_book_title = match min_pages {
            Some(pages) => title_with_page_length(conn, user_id, author_id, pages)?,
            None => "N/A".to_string(),
        };
        let max_book_title = match max_pages {
            Some(pages) => title_with_page_length(conn, user_id, author_id, pages)?,
            None => "N/A".to_string(),
        };
        stats.push(AuthorStats {
            author_name,
            num_books,
            avg_page_length: avg,
            min_book_title,
            min_page_length: min_pages,
            max_book_title,
            max_page_length: max_pages,
        });
    }

    Ok(stats)
}

// Resolves the extreme back to a title by exact page-length match; the
// lowest book_id wins when several books share the value.
fn title_with_page_length(
    conn: &Connection,
    user_id: i64,
    author_id: i64,
    page_length: i64,
) -> AppResult<String> {
    let title: Option<String> = conn
        .query_row(
            "SELECT b.title
             FROM books b
             JOIN written_by wb ON wb.book_id = b.book_id
             WHERE b.user_id = ?1 AND wb.author_id = ?2 AND b.page_length = ?3
             ORDER BY b.book_id ASC
             LIMIT 1",
            params![user_id, author_id, page_length],
            |row| row.get(0),
        )
        .optional()?;

    Ok(title.unwrap_or_else(|| "N/A".to_string()))
}
