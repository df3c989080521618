// Follow graph. Edge uniqueness and the no-self-follow rule live in the
// schema; this module surfaces them as Conflict/BadRequest errors.

use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// A user row decorated with whether the viewer already follows them.
#[derive(Debug, Clone, Serialize)]
pub struct FollowCandidate {
    pub user_id: i64,
    pub username: String,
    pub name: String,
    #[serde(rename = "isFollowing")]
    pub is_following: bool,
}

pub fn follow(conn: &Connection, follower_id: i64, followee_id: i64) -> AppResult<()> {
    if follower_id == followee_id {
        return Err(AppError::BadRequest("You cannot follow yourself".into()));
    }

    let result = conn.execute(
        "INSERT INTO follows (follower_id, followee_id) VALUES (?1, ?2)",
        params![follower_id, followee_id],
    );

    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            // Distinguish a duplicate edge from a missing user
            if is_following(conn, follower_id, followee_id)? {
                Err(AppError::Conflict("Already following this user".into()))
            } else {
                Err(AppError::NotFound("User not found".into()))
            }
        }
        Err(e) => Err(e.into()),
    }
}

pub fn unfollow(conn: &Connection, follower_id: i64, followee_id: i64) -> AppResult<()> {
    let rows = conn.execute(
        "DELETE FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
        params![follower_id, followee_id],
    )?;
    if rows == 0 {
        return Err(AppError::NotFound("Not following this user".into()));
    }
    Ok(())
}

pub fn is_following(conn: &Connection, follower_id: i64, followee_id: i64) -> AppResult<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ?1 AND followee_id = ?2)",
        params![follower_id, followee_id],
        |row| row.get(0),
    )?;
    Ok(exists)
}

pub fn list_followees(conn: &Connection, user_id: i64) -> AppResult<Vec<i64>> {
    let mut stmt =
        conn.prepare("SELECT followee_id FROM follows WHERE follower_id = ?1 ORDER BY followee_id")?;
    let followees = stmt
        .query_map(params![user_id], |row| row.get(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(followees)
}

/// Everyone except the viewer, flagged with current follow state.
pub fn users_to_follow(conn: &Connection, user_id: i64) -> AppResult<Vec<FollowCandidate>> {
    let mut stmt = conn.prepare(
        "SELECT u.user_id, u.username, u.name,
                EXISTS(SELECT 1 FROM follows f
                       WHERE f.follower_id = ?1 AND f.followee_id = u.user_id)
         FROM users u
         WHERE u.user_id <> ?1
         ORDER BY u.username",
    )?;
    let users = stmt
        .query_map(params![user_id], |row| {
            Ok(FollowCandidate {
                user_id: row.get(0)?,
                username: row.get(1)?,
                name: row.get(2)?,
                is_following: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

/// Substring match over username and display name, viewer excluded.
pub fn search_users(
    conn: &Connection,
    query: &str,
    current_user_id: i64,
) -> AppResult<Vec<FollowCandidate>> {
    let pattern = format!("%{}%", query);
    let mut stmt = conn.prepare(
        "SELECT u.user_id, u.username, u.name,
                EXISTS(SELECT 1 FROM follows f
                       WHERE f.follower_id = ?1 AND f.followee_id = u.user_id)
         FROM users u
         WHERE u.user_id <> ?1 AND (u.username LIKE ?2 OR u.name LIKE ?2)
         ORDER BY u.username",
    )?;
    let users = stmt
        .query_map(params![current_user_id, pattern], |row| {
            Ok(FollowCandidate {
                user_id: row.get(0)?,
                username: row.get(1)?,
                name: row.get(2)?,
                is_following: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}
