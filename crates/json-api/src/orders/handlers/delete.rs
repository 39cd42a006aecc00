//! Delete Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{extensions::*, orders::errors::into_status_error, state::State};

/// Delete Order Handler
///
/// Admin only. The order must be pending or canceled.
#[endpoint(
    tags("orders"),
    summary = "Delete Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order deleted"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an admin"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Order is not pending or canceled"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.delete",
    skip(order, depot),
    fields(user_uuid = tracing::field::Empty, order_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let order = order.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(actor.user));
    span.record("order_uuid", tracing::field::display(order));

    state
        .app
        .orders
        .delete_order(actor, order.into())
        .await
        .map_err(into_status_error)?;

    tracing::info!(order_uuid = %order, "deleted order");

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use salvo::test::TestClient;

    use bookstore_app::domain::{
        orders::{
            MockOrdersService, OrdersServiceError,
            records::OrderUuid,
        },
        users::records::Actor,
    };

    use crate::test_helpers::{TEST_ADMIN, TEST_CUSTOMER, TestState, service_as};

    use super::*;

    fn make_service(actor: Actor, orders: MockOrdersService) -> Service {
        service_as(
            actor,
            TestState::new().orders(orders),
            Router::with_path("orders/{order}").delete(handler),
        )
    }

    #[tokio::test]
    async fn admin_deletes_order() {
        let uuid = OrderUuid::new();

        let mut orders = MockOrdersService::new();

        orders
            .expect_delete_order()
            .once()
            .withf(move |actor, o| *actor == TEST_ADMIN && *o == uuid)
            .return_once(|_, _| Ok(()));

        let res = TestClient::delete(format!("http://example.com/orders/{uuid}"))
            .send(&make_service(TEST_ADMIN, orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn customers_get_403() {
        let mut orders = MockOrdersService::new();

        orders
            .expect_delete_order()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::Unauthorized));

        let res = TestClient::delete(format!("http://example.com/orders/{}", OrderUuid::new()))
            .send(&make_service(TEST_CUSTOMER, orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));
    }

    #[tokio::test]
    async fn shipped_order_is_not_deletable() {
        let mut orders = MockOrdersService::new();

        orders
            .expect_delete_order()
            .once()
            .return_once(|_, _| Err(OrdersServiceError::NotDeletable));

        let res = TestClient::delete(format!("http://example.com/orders/{}", OrderUuid::new()))
            .send(&make_service(TEST_ADMIN, orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
