use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{0}")]
    Validation(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("user {user_id} has already voted on topic {topic_id}")]
    DuplicateVote { user_id: String, topic_id: String },

    #[error("option {option_id} does not belong to topic {topic_id}")]
    Referential { option_id: String, topic_id: String },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("database lock poisoned: {0}")]
    Poisoned(String),
}

impl DbError {
    pub(crate) fn not_found(entity: &'static str, id: &str) -> Self {
        DbError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Missing or blank required field.
    pub(crate) fn required(field: &str) -> Self {
        DbError::Validation(format!("{field} is required"))
    }
}

/// True when SQLite rejected a write because of a UNIQUE or PRIMARY KEY constraint.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => matches!(
            e.extended_code,
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        ),
        _ => false,
    }
}
