// Catalog store - books with their authors and publishers. Authors and
// publishers are deduplicated by name; logging a book links all three
// inside one transaction.

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::db::models::{Author, Book, Publisher};
use crate::error::{AppError, AppResult};

/// Sort direction for title listings, validated at the route boundary so
/// caller input never reaches the SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    /// Anything that is not "desc" sorts ascending.
    pub fn parse(raw: &str) -> SortDir {
        if raw.eq_ignore_ascii_case("desc") {
            SortDir::Desc
        } else {
            SortDir::Asc
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// Payload for logging a new book.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub issue: Option<String>,
    pub page_length: Option<i64>,
    pub cover_url: Option<String>,
    pub author: String,
    pub author_dob: Option<String>,
    pub publisher: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoggedBook {
    pub book_id: i64,
    pub author_id: i64,
    pub publisher_id: i64,
}

/// A catalog row shaped for the bookshelf UI, with display fallbacks.
#[derive(Debug, Clone, Serialize)]
pub struct BookListing {
    pub id: i64,
    pub title: String,
    pub author: String,
    #[serde(rename = "coverUrl")]
    pub cover_url: String,
    pub letter: String,
}

const COVER_PLACEHOLDER: &str = "/placeholder.svg?height=192&width=128";

/// Log a book for a user: dedup-insert the author and publisher by name,
/// insert the book, and link both associations. All or nothing.
pub fn log_book(conn: &Connection, user_id: i64, book: &NewBook) -> AppResult<LoggedBook> {
    let user_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE user_id = ?1)",
        params![user_id],
        |row| row.get(0),
    )?;
    if !user_exists {
        return Err(AppError::NotFound("User not found".into()));
    }

    conn.execute("BEGIN IMMEDIATE", [])?;

    let result: AppResult<LoggedBook> = (|| {
        conn.execute(
            "INSERT OR IGNORE INTO authors (name, date_of_birth) VALUES (?1, ?2)",
            params![book.author, book.author_dob],
        )?;
        let author_id: i64 = conn.query_row(
            "SELECT author_id FROM authors WHERE name = ?1",
            params![book.author],
            |row| row.get(0),
        )?;

        conn.execute(
            "INSERT OR IGNORE INTO publishers (name) VALUES (?1)",
            params![book.publisher],
        )?;
        let publisher_id: i64 = conn.query_row(
            "SELECT publisher_id FROM publishers WHERE name = ?1",
            params![book.publisher],
            |row| row.get(0),
        )?;

        conn.execute(
            "INSERT INTO books (user_id, title, issue, page_length, cover_url)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, book.title, book.issue, book.page_length, book.cover_url],
        )?;
        let book_id = conn.last_insert_rowid();

        conn.execute(
            "INSERT INTO written_by (book_id, author_id) VALUES (?1, ?2)",
            params![book_id, author_id],
        )?;
        conn.execute(
            "INSERT INTO published_by (book_id, publisher_id) VALUES (?1, ?2)",
            params![book_id, publisher_id],
        )?;

        Ok(LoggedBook {
            book_id,
            author_id,
            publisher_id,
        })
    })();

    match result {
        Ok(logged) => {
            conn.execute("COMMIT", [])?;
            Ok(logged)
        }
        Err(e) => {
            conn.execute("ROLLBACK", [])?;
            Err(e)
        }
    }
}

pub fn get_book(conn: &Connection, book_id: i64) -> AppResult<Option<Book>> {
    let book = conn
        .query_row(
            "SELECT book_id, user_id, title, issue, page_length, cover_url
             FROM books WHERE book_id = ?1",
            params![book_id],
            |row| {
                Ok(Book {
                    book_id: row.get(0)?,
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                    issue: row.get(3)?,
                    page_length: row.get(4)?,
                    cover_url: row.get(5)?,
                })
            },
        )
        .optional()?;
    Ok(book)
}

pub fn get_author_by_name(conn: &Connection, name: &str) -> AppResult<Option<Author>> {
    let author = conn
        .query_row(
            "SELECT author_id, name, date_of_birth FROM authors WHERE name = ?1",
            params![name],
            |row| {
                Ok(Author {
                    author_id: row.get(0)?,
                    name: row.get(1)?,
                    date_of_birth: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(author)
}

pub fn get_publisher_by_name(conn: &Connection, name: &str) -> AppResult<Option<Publisher>> {
    let publisher = conn
        .query_row(
            "SELECT publisher_id, name FROM publishers WHERE name = ?1",
            params![name],
            |row| {
                Ok(Publisher {
                    publisher_id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(publisher)
}

fn listing_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BookListing> {
    let id: i64 = row.get(0)?;
    let title: String = row.get(1)?;
    let author: Option<String> = row.get(2)?;
    let cover_url: Option<String> = row.get(3)?;
    let letter = title
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_else(|| "?".to_string());
    Ok(BookListing {
        id,
        title,
        author: author.unwrap_or_else(|| "Unknown Author".to_string()),
        cover_url: cover_url.unwrap_or_else(|| COVER_PLACEHOLDER.to_string()),
        letter,
    })
}

const LISTING_COLUMNS: &str = "b.book_id, b.title, GROUP_CONCAT(a.name, ', '), b.cover_url";

/// All books a user has logged, by title.
pub fn list_books_by_user(conn: &Connection, user_id: i64) -> AppResult<Vec<BookListing>> {
    sort_books(conn, user_id, "", SortDir::Asc)
}

/// Exact-title search over a user's books; an empty query lists everything.
pub fn search_books(conn: &Connection, user_id: i64, query: &str) -> AppResult<Vec<BookListing>> {
    sort_books(conn, user_id, query, SortDir::Asc)
}

/// Title-sorted listing, optionally narrowed to an exact title match.
pub fn sort_books(
    conn: &Connection,
    user_id: i64,
    query: &str,
    dir: SortDir,
) -> AppResult<Vec<BookListing>> {
    let sql = format!(
        "SELECT {LISTING_COLUMNS}
         FROM books b
         LEFT JOIN written_by wb ON wb.book_id = b.book_id
         LEFT JOIN authors a ON a.author_id = wb.author_id
         WHERE b.user_id = ?1 AND (?2 = '' OR b.title = ?2)
         GROUP BY b.book_id
         ORDER BY b.title {}",
        dir.as_sql()
    );
    let mut stmt = conn.prepare(&sql)?;
    let books = stmt
        .query_map(params![user_id, query], listing_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(books)
}

/// Books whose page count falls inside the inclusive range. Books without a
/// page length never match.
pub fn books_in_page_range(
    conn: &Connection,
    user_id: i64,
    min_pages: i64,
    max_pages: i64,
) -> AppResult<Vec<BookListing>> {
    let sql = format!(
        "SELECT {LISTING_COLUMNS}
         FROM books b
         LEFT JOIN written_by wb ON wb.book_id = b.book_id
         LEFT JOIN authors a ON a.author_id = wb.author_id
         WHERE b.user_id = ?1 AND b.page_length BETWEEN ?2 AND ?3
         GROUP BY b.book_id
         ORDER BY b.page_length ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let books = stmt
        .query_map(params![user_id, min_pages, max_pages], listing_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(books)
}

/// Books whose title starts with the given letter, case-insensitively.
pub fn books_by_letter(
    conn: &Connection,
    user_id: i64,
    letter: &str,
) -> AppResult<Vec<BookListing>> {
    let sql = format!(
        "SELECT {LISTING_COLUMNS}
         FROM books b
         LEFT JOIN written_by wb ON wb.book_id = b.book_id
         LEFT JOIN authors a ON a.author_id = wb.author_id
         WHERE b.user_id = ?1 AND UPPER(SUBSTR(b.title, 1, 1)) = UPPER(?2)
         GROUP BY b.book_id
         ORDER BY b.title ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let books = stmt
        .query_map(params![user_id, letter], listing_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(books)
}
