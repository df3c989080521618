// Feed composer - read projection over the follow graph and the reading
// ledger. One connection in, rows out; follow edges are the only mutable
// state this depends on.

use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::social;

pub const FEED_CAP: usize = 50;
pub const FEED_ALL_DEFAULT_LIMIT: i64 = 30;
pub const HISTORY_DEFAULT_LIMIT: i64 = 20;

/// One ledger entry joined with its book and reader, as served in feeds.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    pub hasread_id: i64,
    pub user_id: i64,
    pub username: String,
    pub name: String,
    pub book_id: i64,
    pub book_title: String,
    pub cover_url: Option<String>,
    pub date: String,
    pub review: Option<String>,
    pub page_length: Option<i64>,
}

fn feed_item_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FeedItem> {
    Ok(FeedItem {
        hasread_id: row.get(0)?,
        user_id: row.get(1)?,
        username: row.get(2)?,
        name: row.get(3)?,
        book_id: row.get(4)?,
        book_title: row.get(5)?,
        cover_url: row.get(6)?,
        date: row.get(7)?,
        review: row.get(8)?,
        page_length: row.get(9)?,
    })
}

const FEED_COLUMNS: &str = "hr.hasread_id, hr.user_id, u.username, u.name,
     hr.book_id, b.title, b.cover_url, hr.date, hr.review, b.page_length";

/// The single most recent read (highest hasread_id) of every followee who
/// has read anything, newest activity first. Followees with an empty ledger
/// are omitted rather than padded with nulls.
pub fn feed(conn: &Connection, user_id: i64) -> AppResult<Vec<FeedItem>> {
    let sql = format!(
        "SELECT {FEED_COLUMNS}
         FROM has_read hr
         JOIN users u ON u.user_id = hr.user_id
         JOIN books b ON b.book_id = hr.book_id
         JOIN follows f ON f.followee_id = hr.user_id AND f.follower_id = ?1
         WHERE hr.hasread_id = (
             SELECT MAX(hr2.hasread_id) FROM has_read hr2 WHERE hr2.user_id = hr.user_id
         )
         ORDER BY hr.date DESC, hr.hasread_id DESC
         LIMIT {FEED_CAP}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map(params![user_id], feed_item_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

/// Every read by every followee, newest first, capped at `limit`.
pub fn feed_all(conn: &Connection, user_id: i64, limit: i64) -> AppResult<Vec<FeedItem>> {
    let sql = format!(
        "SELECT {FEED_COLUMNS}
         FROM has_read hr
         JOIN users u ON u.user_id = hr.user_id
         JOIN books b ON b.book_id = hr.book_id
         JOIN follows f ON f.followee_id = hr.user_id AND f.follower_id = ?1
         ORDER BY hr.date DESC, hr.hasread_id DESC
         LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map(params![user_id, limit], feed_item_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

/// A user's reading history, visible to themselves and their followers only.
pub fn feed_user(
    conn: &Connection,
    current_user_id: i64,
    target_user_id: i64,
    limit: i64,
) -> AppResult<Vec<FeedItem>> {
    let allowed =
        current_user_id == target_user_id || social::is_following(conn, current_user_id, target_user_id)?;
    if !allowed {
        return Err(AppError::Forbidden(
            "You can only view the reading history of users you follow".into(),
        ));
    }

    let sql = format!(
        "SELECT {FEED_COLUMNS}
         FROM has_read hr
         JOIN users u ON u.user_id = hr.user_id
         JOIN books b ON b.book_id = hr.book_id
         WHERE hr.user_id = ?1
         ORDER BY hr.date DESC, hr.hasread_id DESC
         LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map(params![target_user_id, limit], feed_item_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{seed_book, seed_follow, seed_read, seed_user, test_pool};

    #[test]
    fn feed_is_empty_when_following_nobody() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let alice = seed_user(&conn, "alice");
        let bob = seed_user(&conn, "bob");
        let book = seed_book(&conn, bob, "Unseen", Some(100), "Author A");
        seed_read(&conn, bob, book, "2024-01-01");

        assert!(feed(&conn, alice).unwrap().is_empty());
    }

    #[test]
    fn feed_has_one_entry_per_followee() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let alice = seed_user(&conn, "alice");
        let bob = seed_user(&conn, "bob");
        let carol = seed_user(&conn, "carol");
        seed_follow(&conn, alice, bob);
        seed_follow(&conn, alice, carol);

        let b1 = seed_book(&conn, bob, "Bob One", Some(100), "Author A");
        let b2 = seed_book(&conn, bob, "Bob Two", Some(100), "Author A");
        seed_read(&conn, bob, b1, "2024-01-01");
        seed_read(&conn, bob, b2, "2024-01-05");
        let c1 = seed_book(&conn, carol, "Carol One", Some(100), "Author B");
        seed_read(&conn, carol, c1, "2024-01-03");

        let items = feed(&conn, alice).unwrap();
        assert_eq!(items.len(), 2);
        // Bob's latest first (newer date), and only his latest
        assert_eq!(items[0].book_title, "Bob Two");
        assert_eq!(items[0].username, "bob");
        assert_eq!(items[1].book_title, "Carol One");
    }

    #[test]
    fn followees_with_no_reads_are_omitted() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let alice = seed_user(&conn, "alice");
        let bob = seed_user(&conn, "bob");
        let carol = seed_user(&conn, "carol");
        seed_follow(&conn, alice, bob);
        seed_follow(&conn, alice, carol);
        let b1 = seed_book(&conn, bob, "Bob One", Some(100), "Author A");
        seed_read(&conn, bob, b1, "2024-01-01");

        let items = feed(&conn, alice).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].username, "bob");
    }

    #[test]
    fn latest_per_followee_is_by_hasread_id_not_date() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let alice = seed_user(&conn, "alice");
        let bob = seed_user(&conn, "bob");
        seed_follow(&conn, alice, bob);
        let b1 = seed_book(&conn, bob, "Backdated", Some(100), "Author A");
        let b2 = seed_book(&conn, bob, "Fresh Entry", Some(100), "Author A");
        // The later ledger entry carries an older date; the id wins
        seed_read(&conn, bob, b1, "2024-06-01");
        seed_read(&conn, bob, b2, "2024-01-01");

        let items = feed(&conn, alice).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].book_title, "Fresh Entry");
    }

    #[test]
    fn feed_all_returns_every_followee_read_up_to_limit() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let alice = seed_user(&conn, "alice");
        let bob = seed_user(&conn, "bob");
        seed_follow(&conn, alice, bob);
        let b1 = seed_book(&conn, bob, "One", Some(100), "Author A");
        let b2 = seed_book(&conn, bob, "Two", Some(100), "Author A");
        seed_read(&conn, bob, b1, "2024-01-01");
        seed_read(&conn, bob, b2, "2024-01-02");
        seed_read(&conn, bob, b1, "2024-01-03");

        let items = feed_all(&conn, alice, 30).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].date, "2024-01-03");

        let capped = feed_all(&conn, alice, 2).unwrap();
        assert_eq!(capped.len(), 2);
    }

    #[test]
    fn own_reads_do_not_appear_in_feed_all() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let alice = seed_user(&conn, "alice");
        let mine = seed_book(&conn, alice, "Mine", Some(100), "Author A");
        seed_read(&conn, alice, mine, "2024-01-01");

        assert!(feed_all(&conn, alice, 30).unwrap().is_empty());
    }

    #[test]
    fn history_visible_to_self_and_followers_only() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let alice = seed_user(&conn, "alice");
        let bob = seed_user(&conn, "bob");
        let carol = seed_user(&conn, "carol");
        seed_follow(&conn, alice, bob);
        let b1 = seed_book(&conn, bob, "Bob One", Some(100), "Author A");
        seed_read(&conn, bob, b1, "2024-01-01");

        // Follower sees it
        let items = feed_user(&conn, alice, bob, 20).unwrap();
        assert_eq!(items.len(), 1);

        // Self sees it
        let items = feed_user(&conn, bob, bob, 20).unwrap();
        assert_eq!(items.len(), 1);

        // A stranger gets a 403
        let err = feed_user(&conn, carol, bob, 20).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn history_sorts_by_date_then_id_descending() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let bob = seed_user(&conn, "bob");
        let b1 = seed_book(&conn, bob, "One", Some(100), "Author A");
        let b2 = seed_book(&conn, bob, "Two", Some(100), "Author A");
        seed_read(&conn, bob, b1, "2024-01-02");
        seed_read(&conn, bob, b2, "2024-01-02");

        let items = feed_user(&conn, bob, bob, 20).unwrap();
        // Same date: the later ledger entry comes first
        assert_eq!(items[0].book_title, "Two");
        assert_eq!(items[1].book_title, "One");
    }
}
