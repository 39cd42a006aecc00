//! Cart Errors

use salvo::http::StatusError;

use bookstore_app::domain::carts::CartsServiceError;

use crate::errors::internal_error;

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::NotFound => StatusError::not_found().brief("Cart or cart item not found"),
        CartsServiceError::BookNotFound | CartsServiceError::BookUnavailable => {
            StatusError::bad_request().brief("Book not available for sale")
        }
        CartsServiceError::InsufficientStock { book, available } => StatusError::bad_request()
            .brief("Insufficient stock")
            .detail(format!("book {book} has {available} in stock")),
        CartsServiceError::InvalidQuantity => {
            StatusError::bad_request().brief("Quantity must be at least 1")
        }
        CartsServiceError::InvalidReference
        | CartsServiceError::MissingRequiredData
        | CartsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid cart payload")
        }
        CartsServiceError::Sql(source) => internal_error("cart storage failed", &source),
    }
}

#[cfg(test)]
mod tests {
    use bookstore_app::domain::books::records::BookUuid;
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn insufficient_stock_reports_what_is_left() {
        let book = BookUuid::new();
        let status = into_status_error(CartsServiceError::InsufficientStock { book, available: 2 });

        assert_eq!(status.code, StatusCode::BAD_REQUEST);
        assert_eq!(
            status.detail.as_deref(),
            Some(format!("book {book} has 2 in stock").as_str())
        );
    }
}
