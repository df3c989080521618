pub mod books;
pub mod feed;
pub mod health;
pub mod reads;
pub mod social;
pub mod stats;
pub mod users;

use crate::error::AppError;

/// Query and body params carry user ids as strings (the frontend stores
/// them in localStorage); parse with a uniform 400 on garbage.
pub(crate) fn parse_user_id(raw: &str) -> Result<i64, AppError> {
    parse_param(raw, "user id")
}

/// Numeric params arrive as query strings; a 400 with the JSON error shape
/// beats the framework's plain-text rejection.
pub(crate) fn parse_param<T: std::str::FromStr>(raw: &str, param: &str) -> Result<T, AppError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| AppError::BadRequest(format!("Invalid {param}: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_user_id_accepts_digits() {
        assert_eq!(parse_user_id("42").unwrap(), 42);
        assert_eq!(parse_user_id(" 7 ").unwrap(), 7);
    }

    #[test]
    fn parse_user_id_rejects_garbage() {
        assert!(parse_user_id("").is_err());
        assert!(parse_user_id("abc").is_err());
    }
}
