//! Add Cart Item Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookstore_app::domain::carts::data::NewCartItem;

use crate::{
    carts::{errors::into_status_error, items::CartLineResponse},
    extensions::*,
    state::State,
};

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddCartItemRequest {
    pub book_uuid: Uuid,
    pub quantity: u64,
}

impl From<AddCartItemRequest> for NewCartItem {
    fn from(request: AddCartItemRequest) -> Self {
        NewCartItem {
            book: request.book_uuid.into(),
            quantity: request.quantity,
        }
    }
}

/// Add Cart Item Handler
///
/// Adding a book already in the cart merges the quantities.
#[endpoint(
    tags("cart"),
    summary = "Add Item to Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Item added or merged"),
        (status_code = StatusCode::BAD_REQUEST, description = "Book unavailable or out of stock"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Unauthorized"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "cart.items.add",
    skip(json, depot, res),
    fields(
        user_uuid = tracing::field::Empty,
        book_uuid = tracing::field::Empty,
        quantity = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CartLineResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let item: NewCartItem = json.into_inner().into();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(actor.user));
    span.record("book_uuid", tracing::field::display(item.book));
    span.record("quantity", item.quantity);

    let line = state
        .app
        .carts
        .add_item(actor, item)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/cart/items/{}", line.uuid), true)
        .or_500("failed to set location header")?;

    Ok(Json(line.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use bookstore_app::domain::{
        books::records::BookUuid,
        carts::{CartsServiceError, MockCartsService, records::CartItemUuid},
    };

    use crate::{
        carts::tests::make_item,
        test_helpers::{TEST_CUSTOMER, TestState, service_as},
    };

    use super::*;

    fn make_service(carts: MockCartsService) -> Service {
        service_as(
            TEST_CUSTOMER,
            TestState::new().carts(carts),
            Router::with_path("cart/items").post(handler),
        )
    }

    #[tokio::test]
    async fn adds_item() -> TestResult {
        let book = BookUuid::new();
        let line = CartItemUuid::new();

        let mut carts = MockCartsService::new();

        carts
            .expect_add_item()
            .once()
            .withf(move |actor, item| {
                *actor == TEST_CUSTOMER && *item == NewCartItem { book, quantity: 3 }
            })
            .return_once(move |_, _| Ok(make_item(line, book, 3, 1_000)));

        let mut res = TestClient::post("http://example.com/cart/items")
            .json(&json!({ "book_uuid": book.into_uuid(), "quantity": 3 }))
            .send(&make_service(carts))
            .await;

        let body: CartLineResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.uuid, line.into_uuid());
        assert_eq!(body.quantity, 3);

        Ok(())
    }

    #[tokio::test]
    async fn out_of_stock_returns_400() {
        let book = BookUuid::new();

        let mut carts = MockCartsService::new();

        carts
            .expect_add_item()
            .once()
            .return_once(move |_, _| Err(CartsServiceError::InsufficientStock { book, available: 1 }));

        let res = TestClient::post("http://example.com/cart/items")
            .json(&json!({ "book_uuid": book.into_uuid(), "quantity": 5 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn unapproved_book_returns_400() {
        let mut carts = MockCartsService::new();

        carts
            .expect_add_item()
            .once()
            .return_once(|_, _| Err(CartsServiceError::BookUnavailable));

        let res = TestClient::post("http://example.com/cart/items")
            .json(&json!({ "book_uuid": Uuid::now_v7(), "quantity": 1 }))
            .send(&make_service(carts))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
