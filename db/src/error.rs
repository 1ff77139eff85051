use diesel::result::DatabaseErrorKind;
use thiserror::Error;

use crate::object_id::UserId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A row with the same key already exists.
    #[error("Conflicting row: {0}")]
    Conflict(String),

    /// The reviewer was deactivated or moved to another team after being selected.
    #[error("User {0} can no longer be assigned as a reviewer")]
    Ineligible(UserId),

    #[error("Database Error: {0}")]
    Db(diesel::result::Error),

    #[error("Database Pool Error: {0}")]
    DbPool(#[from] deadpool_diesel::PoolError),

    #[error("Database connection task was aborted")]
    InteractAborted,

    #[error("Migration failed: {0}")]
    Migration(String),
}

impl From<diesel::result::Error> for Error {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Error::Conflict(info.constraint_name().unwrap_or("unique").to_string())
            }
            e => Error::Db(e),
        }
    }
}

impl From<deadpool_diesel::InteractError> for Error {
    fn from(e: deadpool_diesel::InteractError) -> Self {
        match e {
            deadpool_diesel::InteractError::Panic(p) => std::panic::resume_unwind(p),
            deadpool_diesel::InteractError::Aborted => Error::InteractAborted,
        }
    }
}

impl Error {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }

    pub fn is_ineligible(&self) -> bool {
        matches!(self, Error::Ineligible(_))
    }
}
