//! List All Books Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    books::{errors::into_status_error, handlers::get::BookResponse},
    extensions::*,
    state::State,
};

/// List All Books Handler
///
/// Admin view of every listing, including those awaiting approval.
#[endpoint(
    tags("books"),
    summary = "List All Books",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Every book in any moderation state"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an admin"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "books.requested",
    skip(depot),
    fields(user_uuid = tracing::field::Empty, book_count = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<BookResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(actor.user));

    let books = state
        .app
        .books
        .list_all_books(actor)
        .await
        .map_err(into_status_error)?;

    span.record("book_count", tracing::field::display(books.len()));

    Ok(Json(books.into_iter().map(Into::into).collect()))
}
