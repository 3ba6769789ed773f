//! SQLite-backed persistence.
//!
//! Two stores share one database file: [`UserStore`] owns the credential
//! records and the favorites relation, [`MovieStore`] owns the movie
//! catalog. Each operation opens its own connection; there is no shared
//! in-process state and no cross-operation transaction, so the consistency
//! discipline is last-write-wins per row.

pub mod movie_store;
pub mod user_store;

pub use movie_store::MovieStore;
pub use user_store::UserStore;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Duplicate(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// A persisted row failed to decode (bad uuid, bad JSON, bad date).
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// True when an INSERT/UPDATE bounced off a UNIQUE index.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
