use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::error::AppResult;

/// Per-user reading summary. Every field except the count degrades to null
/// when the user's ledger has no data for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingStats {
    pub total_books: i64,
    pub avg_pages: Option<f64>,
    pub favorite_author: Option<String>,
    pub first_book: Option<String>,
    pub latest_book: Option<String>,
}

pub fn reading_stats(conn: &Connection, user_id: i64) -> AppResult<ReadingStats> {
    let total_books: i64 = conn.query_row(
        "SELECT COUNT(*) FROM has_read WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;

    // AVG over the non-null page lengths only; NULL when none exist.
    let avg_pages: Option<f64> = conn.query_row(
        "SELECT ROUND(AVG(b.page_length), 1)
         FROM has_read hr
         JOIN books b ON b.book_id = hr.book_id
         WHERE hr.user_id = ?1 AND b.page_length IS NOT NULL",
        params![user_id],
        |row| row.get(0),
    )?;

    // Most distinct read books per author; lowest author_id wins a tie.
    let favorite_author: Option<String> = conn
        .query_row(
            "SELECT a.name
             FROM has_read hr
             JOIN written_by wb ON wb.book_id = hr.book_id
             JOIN authors a ON a.author_id = wb.author_id
             WHERE hr.user_id = ?1
             GROUP BY a.author_id
             ORDER BY COUNT(DISTINCT hr.book_id) DESC, a.author_id ASC
             LIMIT 1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()?;

    let first_book: Option<String> = conn
        .query_row(
            "SELECT b.title
             FROM has_read hr
             JOIN books b ON b.book_id = hr.book_id
             WHERE hr.user_id = ?1
             ORDER BY hr.date ASC, hr.hasread_id ASC
             LIMIT 1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()?;

    // Latest is by hasread_id, not date, so same-day entries stay ordered.
    let latest_book: Option<String> = conn
        .query_row(
            "SELECT b.title
             FROM has_read hr
             JOIN books b ON b.book_id = hr.book_id
             WHERE hr.user_id = ?1
             ORDER BY hr.hasread_id DESC
             LIMIT 1",
            params![user_id],
            |row| row.get(0),
        )
        .optional()?;

    Ok(ReadingStats {
        total_books,
        avg_pages,
        favorite_author,
        first_book,
        latest_book,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{seed_book, seed_read, seed_user, test_pool};

    #[test]
    fn empty_ledger_yields_nulls() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let user = seed_user(&conn, "alice");

        let stats = reading_stats(&conn, user).unwrap();
        assert_eq!(
            stats,
            ReadingStats {
                total_books: 0,
                avg_pages: None,
                favorite_author: None,
                first_book: None,
                latest_book: None,
            }
        );
    }

    #[test]
    fn averages_ignore_null_page_lengths() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let user = seed_user(&conn, "alice");
        let b1 = seed_book(&conn, user, "First", Some(100), "Author A");
        let b2 = seed_book(&conn, user, "Second", Some(200), "Author A");
        let b3 = seed_book(&conn, user, "Third", None, "Author B");
        seed_read(&conn, user, b1, "2024-01-01");
        seed_read(&conn, user, b2, "2024-01-02");
        seed_read(&conn, user, b3, "2024-01-03");

        let stats = reading_stats(&conn, user).unwrap();
        assert_eq!(stats.total_books, 3);
        assert_eq!(stats.avg_pages, Some(150.0));
        assert_eq!(stats.first_book.as_deref(), Some("First"));
        assert_eq!(stats.latest_book.as_deref(), Some("Third"));
    }

    #[test]
    fn avg_is_null_when_no_book_has_pages() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let user = seed_user(&conn, "alice");
        let b1 = seed_book(&conn, user, "Pageless", None, "Author A");
        seed_read(&conn, user, b1, "2024-01-01");

        let stats = reading_stats(&conn, user).unwrap();
        assert_eq!(stats.total_books, 1);
        assert_eq!(stats.avg_pages, None);
    }

    #[test]
    fn favorite_author_is_most_read_with_lowest_id_tiebreak() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let user = seed_user(&conn, "alice");
        // Two books by A, one by B
        let b1 = seed_book(&conn, user, "A1", Some(100), "Author A");
        let b2 = seed_book(&conn, user, "A2", Some(100), "Author A");
        let b3 = seed_book(&conn, user, "B1", Some(100), "Author B");
        seed_read(&conn, user, b1, "2024-01-01");
        seed_read(&conn, user, b2, "2024-01-02");
        seed_read(&conn, user, b3, "2024-01-03");

        let stats = reading_stats(&conn, user).unwrap();
        assert_eq!(stats.favorite_author.as_deref(), Some("Author A"));

        // One more B read of the same book must not flip the ranking:
        // distinct books count, not ledger rows
        seed_read(&conn, user, b3, "2024-01-04");
        let stats = reading_stats(&conn, user).unwrap();
        assert_eq!(stats.favorite_author.as_deref(), Some("Author A"));
    }

    #[test]
    fn latest_book_follows_hasread_id_for_same_day_entries() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let user = seed_user(&conn, "alice");
        let b1 = seed_book(&conn, user, "Morning", Some(10), "Author A");
        let b2 = seed_book(&conn, user, "Evening", Some(10), "Author A");
        seed_read(&conn, user, b1, "2024-06-01");
        seed_read(&conn, user, b2, "2024-06-01");

        let stats = reading_stats(&conn, user).unwrap();
        assert_eq!(stats.first_book.as_deref(), Some("Morning"));
        assert_eq!(stats.latest_book.as_deref(), Some("Evening"));
    }

    #[test]
    fn stats_are_scoped_to_the_user() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let alice = seed_user(&conn, "alice");
        let bob = seed_user(&conn, "bob");
        let b1 = seed_book(&conn, bob, "Bobs Book", Some(400), "Author B");
        seed_read(&conn, bob, b1, "2024-01-01");

        let stats = reading_stats(&conn, alice).unwrap();
        assert_eq!(stats.total_books, 0);
    }

    #[test]
    fn repeated_calls_are_idempotent() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let user = seed_user(&conn, "alice");
        let b1 = seed_book(&conn, user, "Only", Some(321), "Author A");
        seed_read(&conn, user, b1, "2024-01-01");

        let first = reading_stats(&conn, user).unwrap();
        let second = reading_stats(&conn, user).unwrap();
        assert_eq!(first, second);
    }
}
