//! List Books Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    books::{errors::into_status_error, handlers::get::BookResponse},
    extensions::*,
    state::State,
};

/// List Books Handler
///
/// Only books approved for sale are listed.
#[endpoint(
    tags("books"),
    summary = "List Books",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Approved books"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "books.index", skip(depot), err)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<BookResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    depot.actor_or_401()?;

    let books = state
        .app
        .books
        .list_books()
        .await
        .map_err(into_status_error)?;

    Ok(Json(books.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use bookstore_app::domain::books::{
        BooksServiceError, MockBooksService,
        records::{BookStatus, BookUuid},
    };

    use crate::test_helpers::{TEST_CUSTOMER, TEST_SELLER, TestState, service_as};

    use super::{super::tests::make_book, *};

    fn make_service(books: MockBooksService) -> Service {
        service_as(
            TEST_CUSTOMER,
            TestState::new().books(books),
            Router::with_path("books").get(handler),
        )
    }

    #[tokio::test]
    async fn lists_books() -> TestResult {
        let mut books = MockBooksService::new();

        books.expect_list_books().once().return_once(|| {
            Ok(vec![
                make_book(BookUuid::new(), TEST_SELLER.user, BookStatus::Approved),
                make_book(BookUuid::new(), TEST_SELLER.user, BookStatus::Approved),
            ])
        });

        let mut res = TestClient::get("http://example.com/books")
            .send(&make_service(books))
            .await;

        let body: Vec<BookResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn storage_failure_returns_500() {
        let mut books = MockBooksService::new();

        books
            .expect_list_books()
            .once()
            .return_once(|| Err(BooksServiceError::Sql(sqlx::Error::PoolTimedOut)));

        let res = TestClient::get("http://example.com/books")
            .send(&make_service(books))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));
    }
}
