//! Update Book Handler

use std::sync::Arc;

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookstore_app::domain::books::data::BookUpdate;

use crate::{
    books::{errors::into_status_error, handlers::get::BookResponse},
    extensions::*,
    state::State,
};

/// Update Book Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateBookRequest {
    pub category_uuid: Uuid,
    pub name: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    pub price: u64,
    pub stock: u64,
}

impl From<UpdateBookRequest> for BookUpdate {
    fn from(request: UpdateBookRequest) -> Self {
        BookUpdate {
            category: request.category_uuid.into(),
            name: request.name,
            author: request.author,
            description: request.description,
            price: request.price,
            stock: request.stock,
        }
    }
}

/// Update Book Handler
///
/// Any edit sends the listing back for approval.
#[endpoint(
    tags("books"),
    summary = "Update Book",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Book updated"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller does not own the book"),
        (status_code = StatusCode::NOT_FOUND, description = "Book not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "books.update",
    skip(book, json, depot),
    fields(user_uuid = tracing::field::Empty, book_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    book: PathParam<Uuid>,
    json: JsonBody<UpdateBookRequest>,
    depot: &mut Depot,
) -> Result<Json<BookResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let book = book.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(actor.user));
    span.record("book_uuid", tracing::field::display(book));

    let updated = state
        .app
        .books
        .update_book(actor, book.into(), json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(updated.into()))
}
