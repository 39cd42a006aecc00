//! Payment Errors

use salvo::http::StatusError;

use bookstore_app::domain::payments::PaymentsServiceError;

use crate::errors::internal_error;

pub(crate) fn into_status_error(error: PaymentsServiceError) -> StatusError {
    match error {
        PaymentsServiceError::NotFound => {
            StatusError::not_found().brief("Order or payment not found")
        }
        PaymentsServiceError::Unauthorized => {
            StatusError::forbidden().brief("Not allowed to manage payments")
        }
        PaymentsServiceError::Validation(errors) => StatusError::unprocessable_entity()
            .brief("Invalid payment")
            .detail(errors.to_string()),
        PaymentsServiceError::AlreadySettled => {
            StatusError::conflict().brief("Payment already settled")
        }
        PaymentsServiceError::InvalidReference
        | PaymentsServiceError::MissingRequiredData
        | PaymentsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid payment data")
        }
        PaymentsServiceError::Sql(source) => internal_error("payment transaction failed", &source),
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn settlement_conflict_is_409() {
        let status = into_status_error(PaymentsServiceError::AlreadySettled);

        assert_eq!(status.code, StatusCode::CONFLICT);
    }
}
