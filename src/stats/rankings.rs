use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MostReadBook {
    pub book_id: i64,
    pub title: String,
    pub read_count: i64,
}

/// The book read most often across all users in the given year. Ties go to
/// the lowest book_id. None when the ledger has nothing for that year.
pub fn most_read_book(conn: &Connection, year: i32) -> AppResult<Option<MostReadBook>> {
    let book = conn
        .query_row(
            "SELECT b.book_id, b.title, COUNT(*) AS read_count
             FROM has_read hr
             JOIN books b ON b.book_id = hr.book_id
             WHERE CAST(strftime('%Y', hr.date) AS INTEGER) = ?1
             GROUP BY b.book_id
             ORDER BY read_count DESC, b.book_id ASC
             LIMIT 1",
            params![year],
            |row| {
                Ok(MostReadBook {
                    book_id: row.get(0)?,
                    title: row.get(1)?,
                    read_count: row.get(2)?,
                })
            },
        )
        .optional()?;

    Ok(book)
}

/// Distinct ledger years, newest first. An empty ledger falls back to the
/// current year and the two before it so year pickers have something to show.
pub fn available_years(conn: &Connection, current_year: i32) -> AppResult<Vec<i32>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT CAST(strftime('%Y', date) AS INTEGER) AS year
         FROM has_read
         ORDER BY year DESC",
    )?;
    let years: Vec<i32> = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;

    if years.is_empty() {
        return Ok(vec![current_year, current_year - 1, current_year - 2]);
    }
    Ok(years)
}
