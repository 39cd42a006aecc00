//! Reports service errors.

use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportsServiceError {
    #[error("caller may not view this report")]
    Unauthorized,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for ReportsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::ColumnDecode { .. }) {
            return Self::InvalidData;
        }

        Self::Sql(error)
    }
}
