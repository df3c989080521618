use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCount {
    pub date: String,
    pub books_read: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyReads {
    pub weekly_reads: Vec<DayCount>,
    pub date_range: DateRange,
}

/// Day-by-day read counts for the 7-day window ending on `today`, ascending
/// and zero-filled. The caller supplies the reference date (UTC today in the
/// route) so results are reproducible.
pub fn weekly_reads(conn: &Connection, today: NaiveDate) -> AppResult<WeeklyReads> {
    let start = today - Duration::days(6);
    let start_str = start.format("%Y-%m-%d").to_string();
    let end_str = today.format("%Y-%m-%d").to_string();

    let mut stmt = conn.prepare(
        "SELECT date, COUNT(*)
         FROM has_read
         WHERE date BETWEEN ?1 AND ?2
         GROUP BY date",
    )?;
    let counts: HashMap<String, i64> = stmt
        .query_map(params![start_str, end_str], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?
        .collect::<Result<HashMap<_, _>, _>>()?;

    let weekly_reads = (0..7)
        .map(|offset| {
            let date = (start + Duration::days(offset)).format("%Y-%m-%d").to_string();
            let books_read = counts.get(&date).copied().unwrap_or(0);
            DayCount { date, books_read }
        })
        .collect();

    Ok(WeeklyReads {
        weekly_reads,
        date_range: DateRange {
            start: start_str,
            end: end_str,
        },
    })
}
