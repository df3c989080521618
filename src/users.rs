// User identities. Registration hashes the password with bcrypt; login is a
// plain credential match against the stored hash.

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::models::User;
use crate::error::{AppError, AppResult};

pub fn create_user(
    conn: &Connection,
    username: &str,
    name: &str,
    age: Option<i64>,
    password: &str,
) -> AppResult<i64> {
    let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))?;

    let result = conn.execute(
        "INSERT INTO users (username, name, age, password_hash) VALUES (?1, ?2, ?3, ?4)",
        params![username, name, age, hash],
    );

    match result {
        Ok(_) => Ok(conn.last_insert_rowid()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(AppError::Conflict("Username already exists".into()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Check credentials and return the matching user.
pub fn verify_login(conn: &Connection, username: &str, password: &str) -> AppResult<User> {
    let row: Option<(i64, String, Option<i64>, String)> = conn
        .query_row(
            "SELECT user_id, name, age, password_hash FROM users WHERE username = ?1",
            params![username],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .optional()?;

    let (user_id, name, age, hash) = row.ok_or_else(|| {
        AppError::Unauthorized("Invalid username or password".into())
    })?;

    let matches = bcrypt::verify(password, &hash)
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {e}")))?;
    if !matches {
        return Err(AppError::Unauthorized("Invalid username or password".into()));
    }

    Ok(User {
        user_id,
        username: username.to_string(),
        name,
        age,
    })
}

pub fn get_user(conn: &Connection, user_id: i64) -> AppResult<Option<User>> {
    let user = conn
        .query_row(
            "SELECT user_id, username, name, age FROM users WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(User {
                    user_id: row.get(0)?,
                    username: row.get(1)?,
                    name: row.get(2)?,
                    age: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(user)
}

pub fn list_users(conn: &Connection) -> AppResult<Vec<User>> {
    let mut stmt =
        conn.prepare("SELECT user_id, username, name, age FROM users ORDER BY user_id")?;
    let users = stmt
        .query_map([], |row| {
            Ok(User {
                user_id: row.get(0)?,
                username: row.get(1)?,
                name: row.get(2)?,
                age: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

/// Admin delete. Foreign keys cascade to the user's books, ledger entries,
/// stars, and follow edges in both directions.
pub fn delete_user(conn: &Connection, user_id: i64) -> AppResult<()> {
    let rows = conn.execute("DELETE FROM users WHERE user_id = ?1", params![user_id])?;
    if rows == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{seed_book, seed_follow, seed_read, seed_user, test_pool};

    #[test]
    fn register_then_login_round_trips() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        let id = create_user(&conn, "alice", "Alice", Some(30), "hunter2").unwrap();
        let user = verify_login(&conn, "alice", "hunter2").unwrap();
        assert_eq!(user.user_id, id);
        assert_eq!(user.name, "Alice");
    }

    #[test]
    fn wrong_password_is_unauthorized() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        create_user(&conn, "alice", "Alice", None, "hunter2").unwrap();
        let err = verify_login(&conn, "alice", "wrong").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn unknown_username_is_unauthorized() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        let err = verify_login(&conn, "ghost", "whatever").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn duplicate_username_conflicts() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        create_user(&conn, "alice", "Alice", None, "pw").unwrap();
        let err = create_user(&conn, "alice", "Other Alice", None, "pw2").unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn delete_cascades_to_owned_rows_and_edges() {
        let pool = test_pool();
        let conn = pool.get().unwrap();
        let alice = seed_user(&conn, "alice");
        let bob = seed_user(&conn, "bob");
        let book = seed_book(&conn, alice, "Hers", Some(100), "Author A");
        seed_read(&conn, alice, book, "2024-01-01");
        conn.execute(
            "INSERT INTO starred (user_id, book_id, starred) VALUES (?1, ?2, 1)",
            params![alice, book],
        )
        .unwrap();
        seed_follow(&conn, alice, bob);
        seed_follow(&conn, bob, alice);

        delete_user(&conn, alice).unwrap();

        for (table, expected) in [
            ("books", 0i64),
            ("has_read", 0),
            ("starred", 0),
            ("follows", 0),
            ("written_by", 0),
        ] {
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .unwrap();
            assert_eq!(count, expected, "table {table} not fully cascaded");
        }

        // Bob is untouched
        assert!(get_user(&conn, bob).unwrap().is_some());
    }

    #[test]
    fn delete_unknown_user_is_not_found() {
        let pool = test_pool();
        let conn = pool.get().unwrap();

        let err = delete_user(&conn, 42).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
