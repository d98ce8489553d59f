use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Role given to every newly registered account.
pub const DEFAULT_ROLE_ID: i64 = 1;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub mail: String,
    #[serde(skip_serializing)]
    pub password: String, // Argon2 hash, never sent out
    pub role_id: i64,
    pub topic_nbr: i64,
    pub last_connection: Option<OffsetDateTime>,
}

/// Validated registration data, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub mail: String,
    pub password_hash: String,
}
