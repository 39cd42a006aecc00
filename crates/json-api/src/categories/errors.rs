//! Category Errors

use salvo::http::StatusError;

use bookstore_app::domain::categories::CategoriesServiceError;

use crate::errors::internal_error;

pub(crate) fn into_status_error(error: CategoriesServiceError) -> StatusError {
    match error {
        CategoriesServiceError::AlreadyExists => {
            StatusError::conflict().brief("Category already exists")
        }
        CategoriesServiceError::NotFound => StatusError::not_found().brief("Category not found"),
        CategoriesServiceError::Unauthorized => {
            StatusError::forbidden().brief("Only admins can manage categories")
        }
        CategoriesServiceError::MissingRequiredData | CategoriesServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid category payload")
        }
        CategoriesServiceError::Sql(source) => internal_error("category storage failed", &source),
    }
}
