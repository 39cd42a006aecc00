//! Book Errors

use salvo::http::StatusError;

use bookstore_app::domain::books::BooksServiceError;

use crate::errors::internal_error;

pub(crate) fn into_status_error(error: BooksServiceError) -> StatusError {
    match error {
        BooksServiceError::AlreadyExists => StatusError::conflict().brief("Book already exists"),
        BooksServiceError::NotFound => StatusError::not_found().brief("Book not found"),
        BooksServiceError::Unauthorized => {
            StatusError::forbidden().brief("Not allowed to manage this book")
        }
        BooksServiceError::InvalidReference => StatusError::bad_request()
            .brief("Unknown category, or the book is referenced by an order"),
        BooksServiceError::MissingRequiredData | BooksServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid book payload")
        }
        BooksServiceError::Sql(source) => internal_error("book storage failed", &source),
    }
}
