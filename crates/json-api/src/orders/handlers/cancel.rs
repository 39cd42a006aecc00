//! Cancel Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    extensions::*,
    orders::{errors::into_status_error, handlers::get::OrderResponse},
    state::State,
};

/// Cancel Order Handler
///
/// Buyers may cancel their own orders while they are still pending.
#[endpoint(
    tags("orders"),
    summary = "Cancel Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order canceled"),
        (status_code = StatusCode::BAD_REQUEST, description = "Order is no longer pending"),
        (status_code = StatusCode::FORBIDDEN, description = "Not the buyer"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.cancel",
    skip(order, depot),
    fields(user_uuid = tracing::field::Empty, order_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let order = order.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(actor.user));
    span.record("order_uuid", tracing::field::display(order));

    let canceled = state
        .app
        .orders
        .cancel_order(actor, order.into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(canceled.into()))
}
