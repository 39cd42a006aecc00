//! Order Errors

use salvo::http::StatusError;

use bookstore_app::domain::orders::OrdersServiceError;

use crate::errors::internal_error;

pub(crate) fn into_status_error(error: OrdersServiceError) -> StatusError {
    match error {
        OrdersServiceError::NotFound => StatusError::not_found().brief("Order not found"),
        OrdersServiceError::EmptyCart => StatusError::bad_request().brief("Cart is empty"),
        OrdersServiceError::InsufficientStock { book, available } => StatusError::bad_request()
            .brief("Insufficient stock")
            .detail(format!("book {book} has {available} in stock")),
        OrdersServiceError::Unauthorized => {
            StatusError::forbidden().brief("Not allowed to manage this order")
        }
        OrdersServiceError::OrderAlreadyFinal(status) => StatusError::bad_request()
            .brief("Order already final")
            .detail(format!("order is {status}")),
        OrdersServiceError::NotPending => {
            StatusError::bad_request().brief("Only pending orders can be canceled")
        }
        OrdersServiceError::NotDeletable => {
            StatusError::bad_request().brief("Only pending or canceled orders can be deleted")
        }
        OrdersServiceError::InvalidTransition { from, to } => StatusError::bad_request()
            .brief("Invalid status transition")
            .detail(format!("cannot move from {from} to {to}")),
        OrdersServiceError::InvalidReference
        | OrdersServiceError::MissingRequiredData
        | OrdersServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid order data")
        }
        OrdersServiceError::Sql(source) => internal_error("order transaction failed", &source),
    }
}
