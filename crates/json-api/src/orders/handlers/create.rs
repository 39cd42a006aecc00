//! Place Order Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, prelude::*};

use bookstore_app::domain::orders::OrdersServiceError;

use crate::{
    extensions::*,
    observability::{CheckoutOutcome, observe_checkout},
    orders::{errors::into_status_error, handlers::get::OrderResponse},
    state::State,
};

const fn outcome_of(error: &OrdersServiceError) -> CheckoutOutcome {
    match error {
        OrdersServiceError::EmptyCart => CheckoutOutcome::EmptyCart,
        OrdersServiceError::InsufficientStock { .. } => CheckoutOutcome::InsufficientStock,
        _ => CheckoutOutcome::Failed,
    }
}

/// Place Order Handler
///
/// Turns the caller's cart into a pending, unpaid order.
#[endpoint(
    tags("orders"),
    summary = "Place Order",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order placed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Cart is empty or stock is short"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.create",
    skip(depot, res),
    fields(
        user_uuid = tracing::field::Empty,
        order_uuid = tracing::field::Empty,
        total_price = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(actor.user));

    let order = match state.app.orders.place_order(actor).await {
        Ok(order) => order,
        Err(error) => {
            observe_checkout(outcome_of(&error));

            return Err(into_status_error(error));
        }
    };

    observe_checkout(CheckoutOutcome::Placed);

    span.record("order_uuid", tracing::field::display(order.uuid));
    span.record("total_price", order.total_price);

    res.add_header(LOCATION, format!("/orders/{}", order.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(order.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use bookstore_app::domain::{
        books::records::BookUuid,
        orders::{
            MockOrdersService,
            records::{OrderStatus, OrderUuid},
        },
    };

    use crate::test_helpers::{TEST_CUSTOMER, TestState, service_as};

    use super::{super::tests::make_order, *};

    fn make_service(orders: MockOrdersService) -> Service {
        service_as(
            TEST_CUSTOMER,
            TestState::new().orders(orders),
            Router::with_path("orders").post(handler),
        )
    }

    #[tokio::test]
    async fn places_order_and_returns_201_with_location() -> TestResult {
        let uuid = OrderUuid::new();

        let mut orders = MockOrdersService::new();

        orders
            .expect_place_order()
            .once()
            .withf(|actor| *actor == TEST_CUSTOMER)
            .return_once(move |_| Ok(make_order(uuid, TEST_CUSTOMER.user, OrderStatus::Pending)));

        let mut res = TestClient::post("http://example.com/orders")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        let location = res
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);

        assert_eq!(location, Some(format!("/orders/{uuid}")));

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(body.uuid, uuid.into_uuid());
        assert_eq!(body.payment_status, "unpaid");

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_is_400() {
        let mut orders = MockOrdersService::new();

        orders
            .expect_place_order()
            .once()
            .return_once(|_| Err(OrdersServiceError::EmptyCart));

        let res = TestClient::post("http://example.com/orders")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn insufficient_stock_is_400() {
        let mut orders = MockOrdersService::new();

        orders.expect_place_order().once().return_once(|_| {
            Err(OrdersServiceError::InsufficientStock {
                book: BookUuid::new(),
                available: 1,
            })
        });

        let res = TestClient::post("http://example.com/orders")
            .send(&make_service(orders))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn classifies_checkout_failures() {
        assert_eq!(outcome_of(&OrdersServiceError::EmptyCart), CheckoutOutcome::EmptyCart);
        assert_eq!(
            outcome_of(&OrdersServiceError::InsufficientStock {
                book: BookUuid::new(),
                available: 0,
            }),
            CheckoutOutcome::InsufficientStock
        );
        assert_eq!(outcome_of(&OrdersServiceError::InvalidData), CheckoutOutcome::Failed);
    }
}
