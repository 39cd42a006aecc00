//! Get Cart Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookstore_app::domain::carts::records::{CartItemRecord, CartRecord};

use crate::{carts::errors::into_status_error, extensions::*, state::State};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// The unique identifier of the cart
    pub uuid: Uuid,

    /// The items in the cart
    pub items: Vec<CartItemResponse>,

    /// Sum of line totals in cents
    pub subtotal: u64,

    /// Amount due in cents
    pub total: u64,

    /// The date and time the cart was created
    pub created_at: String,

    /// The date and time the cart was last updated
    pub updated_at: String,
}

impl From<CartRecord> for CartResponse {
    fn from(cart: CartRecord) -> Self {
        Self {
            uuid: cart.uuid.into_uuid(),
            items: cart.items.into_iter().map(CartItemResponse::from).collect(),
            subtotal: cart.subtotal,
            total: cart.total,
            created_at: cart.created_at.to_string(),
            updated_at: cart.updated_at.to_string(),
        }
    }
}

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartItemResponse {
    /// The unique identifier of the cart item
    pub uuid: Uuid,

    /// The book on this line
    pub book_uuid: Uuid,

    pub quantity: u64,

    /// Unit price in cents captured when the line was last changed
    pub price: u64,

    /// `quantity × price` in cents
    pub line_total: u64,

    /// The date and time the line was last updated
    pub updated_at: String,
}

impl From<CartItemRecord> for CartItemResponse {
    fn from(item: CartItemRecord) -> Self {
        Self {
            uuid: item.uuid.into_uuid(),
            book_uuid: item.book_uuid.into_uuid(),
            quantity: item.quantity,
            price: item.price,
            // Carts whose totals overflow are rejected by the service.
            line_total: item.line_total().unwrap_or(u64::MAX),
            updated_at: item.updated_at.to_string(),
        }
    }
}

/// Get Cart Handler
///
/// Returns the caller's cart with computed totals.
#[endpoint(
    tags("cart"),
    summary = "View Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart with totals"),
        (status_code = StatusCode::NOT_FOUND, description = "Cart is empty"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "carts.get", skip(depot), err)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let cart = state
        .app
        .carts
        .get_cart(actor)
        .await
        .map_err(into_status_error)?;

    Ok(Json(cart.into()))
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use bookstore_app::domain::{
        books::records::BookUuid,
        carts::{
            CartsServiceError, MockCartsService,
            records::{CartItemUuid, CartUuid},
        },
    };

    use crate::test_helpers::{TEST_CUSTOMER, TestState, service_as};

    use super::{super::tests::make_item, *};

    fn make_service(carts: MockCartsService) -> Service {
        service_as(
            TEST_CUSTOMER,
            TestState::new().carts(carts),
            Router::with_path("cart").get(handler),
        )
    }

    #[tokio::test]
    async fn returns_items_and_totals() -> TestResult {
        let cart = CartRecord {
            uuid: CartUuid::new(),
            user_uuid: TEST_CUSTOMER.user,
            subtotal: 2_500,
            total: 2_500,
            items: vec![
                make_item(CartItemUuid::new(), BookUuid::new(), 2, 1_000),
                make_item(CartItemUuid::new(), BookUuid::new(), 1, 500),
            ],
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        };

        let mut carts = MockCartsService::new();

        carts
            .expect_get_cart()
            .once()
            .withf(|actor| *actor == TEST_CUSTOMER)
            .return_once(move |_| Ok(cart));

        let mut res = TestClient::get("http://example.com/cart")
            .send(&make_service(carts))
            .await;

        let body: CartResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.total, 2_500);
        assert_eq!(
            body.items.iter().map(|item| item.line_total).collect::<Vec<_>>(),
            vec![2_000, 500]
        );

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_returns_404() {
        let mut carts = MockCartsService::new();

        carts
            .expect_get_cart()
            .once()
            .return_once(|_| Err(CartsServiceError::NotFound));

        let res = TestClient::get("http://example.com/cart")
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }
}
