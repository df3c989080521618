use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub name: String,
    pub age: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub book_id: i64,
    pub user_id: i64,
    pub title: String,
    pub issue: Option<String>,
    pub page_length: Option<i64>,
    pub cover_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub author_id: i64,
    pub name: String,
    pub date_of_birth: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Publisher {
    pub publisher_id: i64,
    pub name: String,
}

/// One entry in the append-only reading ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HasRead {
    pub hasread_id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub date: String,
    pub review: Option<String>,
}
