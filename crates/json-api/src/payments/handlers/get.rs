//! Get Payment Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    payments::{errors::into_status_error, handlers::PaymentResponse},
    state::State,
};

/// Get Payment Handler
///
/// Admins may read any payment; other callers only their own.
#[endpoint(
    tags("payments"),
    summary = "Get Payment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Payment found"),
        (status_code = StatusCode::FORBIDDEN, description = "Payment belongs to someone else"),
        (status_code = StatusCode::NOT_FOUND, description = "Payment not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "payments.get",
    skip(payment, depot),
    fields(user_uuid = tracing::field::Empty, payment_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    payment: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<PaymentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let payment = payment.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(actor.user));
    span.record("payment_uuid", tracing::field::display(payment));

    let payment = state
        .app
        .payments
        .get_payment(actor, payment.into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(payment.into()))
}
