//! Delete Book Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{books::errors::into_status_error, extensions::*, state::State};

/// Delete Book Handler
#[endpoint(
    tags("books"),
    summary = "Delete Book",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Book deleted"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller does not own the book"),
        (status_code = StatusCode::NOT_FOUND, description = "Book not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Book is referenced by an order"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "books.delete",
    skip(book, depot),
    fields(user_uuid = tracing::field::Empty, book_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    book: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let book = book.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(actor.user));
    span.record("book_uuid", tracing::field::display(book));

    state
        .app
        .books
        .delete_book(actor, book.into())
        .await
        .map_err(into_status_error)?;

    tracing::info!(book_uuid = %book, "deleted book");

    Ok(StatusCode::OK)
}
