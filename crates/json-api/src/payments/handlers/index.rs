//! List Payments Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    payments::{errors::into_status_error, handlers::PaymentResponse},
    state::State,
};

/// List Payments Handler
///
/// Every payment, newest first. Admin only.
#[endpoint(
    tags("payments"),
    summary = "List Payments",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "All payments"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an admin"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "payments.index", skip(depot), err)]
pub(crate) async fn handler(
    depot: &mut Depot,
) -> Result<Json<Vec<PaymentResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let payments = state
        .app
        .payments
        .list_payments(actor)
        .await
        .map_err(into_status_error)?;

    Ok(Json(payments.into_iter().map(Into::into).collect()))
}
