//! Update Payment Status Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookstore_app::domain::payments::records::PaymentState;

use crate::{
    extensions::*,
    payments::{errors::into_status_error, handlers::PaymentResponse},
    state::State,
};

/// Update Payment Status Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdatePaymentStatusRequest {
    /// pending, completed or failed
    pub status: String,
}

/// Update Payment Status Handler
///
/// Admin only. Completing a card payment marks its order paid; nothing ever
/// marks an order unpaid again.
#[endpoint(
    tags("payments"),
    summary = "Update Payment Status",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Payment updated"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Unknown payment status"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an admin"),
        (status_code = StatusCode::NOT_FOUND, description = "Payment not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "payments.update_status",
    skip(payment, json, depot),
    fields(
        user_uuid = tracing::field::Empty,
        payment_uuid = tracing::field::Empty,
        status = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    json: JsonBody<UpdatePaymentStatusRequest>,
    depot: &mut Depot,
) -> Result<Json<PaymentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let payment = payment.into_inner();

    let status: PaymentState = json.into_inner().status.parse().map_err(|e| {
        StatusError::unprocessable_entity()
            .brief("Unknown payment status")
            .detail(format!("{e}"))
    })?;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(actor.user));
    span.record("payment_uuid", tracing::field::display(payment));
    span.record("status", status.as_str());

    let updated = state
        .app
        .payments
        .update_payment_status(actor, payment.into(), status)
        .await
        .map_err(into_status_error)?;

    Ok(Json(updated.into()))
}
