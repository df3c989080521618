// Shared fixtures for unit tests: an in-memory database plus terse seed
// helpers that go straight to SQL.

use rusqlite::{params, Connection};

use crate::db;
use crate::state::DbPool;

pub(crate) fn test_pool() -> DbPool {
    let pool = db::create_test_pool().unwrap();
    db::run_migrations(&pool).unwrap();
    pool
}

pub(crate) fn seed_user(conn: &Connection, username: &str) -> i64 {
    conn.execute(
        "INSERT INTO users (username, name, age, password_hash) VALUES (?1, ?2, 30, 'hash')",
        params![username, username],
    )
    .unwrap();
    conn.last_insert_rowid()
}

pub(crate) fn seed_author(conn: &Connection, name: &str) -> i64 {
    conn.execute(
        "INSERT OR IGNORE INTO authors (name) VALUES (?1)",
        params![name],
    )
    .unwrap();
    conn.query_row(
        "SELECT author_id FROM authors WHERE name = ?1",
        params![name],
        |row| row.get(0),
    )
    .unwrap()
}

pub(crate) fn seed_book(
    conn: &Connection,
    user_id: i64,
    title: &str,
    page_length: Option<i64>,
    author: &str,
) -> i64 {
    let author_id = seed_author(conn, author);
    conn.execute(
        "INSERT INTO books (user_id, title, page_length) VALUES (?1, ?2, ?3)",
        params![user_id, title, page_length],
    )
    .unwrap();
    let book_id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO written_by (book_id, author_id) VALUES (?1, ?2)",
        params![book_id, author_id],
    )
    .unwrap();
    book_id
}

pub(crate) fn seed_read(conn: &Connection, user_id: i64, book_id: i64, date: &str) -> i64 {
    conn.execute(
        "INSERT INTO has_read (user_id, book_id, date) VALUES (?1, ?2, ?3)",
        params![user_id, book_id, date],
    )
    .unwrap();
    conn.last_insert_rowid()
}

pub(crate) fn seed_follow(conn: &Connection, follower_id: i64, followee_id: i64) {
    conn.execute(
        "INSERT INTO follows (follower_id, followee_id) VALUES (?1, ?2)",
        params![follower_id, followee_id],
    )
    .unwrap();
}
