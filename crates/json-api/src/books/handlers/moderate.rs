//! Book Moderation Handlers

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

use crate::{
    books::{errors::into_status_error, handlers::get::BookResponse},
    extensions::*,
    state::State,
};

/// Reject Book Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RejectBookRequest {
    /// Shown to the seller
    pub note: String,
}

/// Approve Book Handler
#[endpoint(
    tags("books"),
    summary = "Approve Book",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Book approved for sale"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an admin"),
        (status_code = StatusCode::NOT_FOUND, description = "Book not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "books.approve",
    skip(book, depot),
    fields(book_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn approve(
    book: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<BookResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let book = book.into_inner();

    tracing::Span::current().record("book_uuid", tracing::field::display(book));

    let approved = state
        .app
        .books
        .approve_book(actor, book.into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(approved.into()))
}

/// Reject Book Handler
#[endpoint(
    tags("books"),
    summary = "Reject Book",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Book rejected"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an admin"),
        (status_code = StatusCode::NOT_FOUND, description = "Book not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "books.reject",
    skip(book, json, depot),
    fields(book_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn reject(
    book: PathParam<Uuid>,
    json: JsonBody<RejectBookRequest>,
    depot: &mut Depot,
) -> Result<Json<BookResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let book = book.into_inner();

    tracing::Span::current().record("book_uuid", tracing::field::display(book));

    let rejected = state
        .app
        .books
        .reject_book(actor, book.into(), json.into_inner().note)
        .await
        .map_err(into_status_error)?;

    Ok(Json(rejected.into()))
}
