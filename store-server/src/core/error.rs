use thiserror::Error;

use crate::db::repository::RepoError;
use crate::utils::AppError;

/// Failures that stop the server from starting or serving
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] AppError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<RepoError> for ServerError {
    fn from(err: RepoError) -> Self {
        Self::Database(err.into())
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
