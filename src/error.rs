use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0}")]
    Validation(String),

    #[error("An account named '{0}' already exists")]
    DuplicateName(String),

    #[error("No such account: id {0}")]
    AccountNotFound(i64),

    #[error("Data access error: {0}")]
    DataAccess(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
