//! Report Errors

use salvo::http::StatusError;

use bookstore_app::domain::reports::ReportsServiceError;

use crate::errors::internal_error;

pub(crate) fn into_status_error(error: ReportsServiceError) -> StatusError {
    match error {
        ReportsServiceError::Unauthorized => {
            StatusError::forbidden().brief("Not allowed to view this report")
        }
        ReportsServiceError::InvalidData => {
            internal_error("report contained unreadable data", &error)
        }
        ReportsServiceError::Sql(source) => internal_error("report query failed", &source),
    }
}
