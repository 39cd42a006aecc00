//! Create Book Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookstore_app::domain::books::{data::NewBook, records::BookUuid};

use crate::{
    books::{errors::into_status_error, handlers::get::BookResponse},
    extensions::*,
    state::State,
};

/// Create Book Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateBookRequest {
    /// Client-chosen identifier; generated when omitted
    pub uuid: Option<Uuid>,
    pub category_uuid: Uuid,
    pub name: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    /// Unit price in cents
    pub price: u64,
    pub stock: u64,
}

impl From<CreateBookRequest> for NewBook {
    fn from(request: CreateBookRequest) -> Self {
        NewBook {
            uuid: request.uuid.map_or_else(BookUuid::new, BookUuid::from_uuid),
            category: request.category_uuid.into(),
            name: request.name,
            author: request.author,
            description: request.description,
            price: request.price,
            stock: request.stock,
        }
    }
}

/// Create Book Handler
///
/// New listings start out pending approval.
#[endpoint(
    tags("books"),
    summary = "Create Book",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Book listed"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller cannot sell books"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "books.create",
    skip(json, depot, res),
    fields(
        user_uuid = tracing::field::Empty,
        book_uuid = tracing::field::Empty,
        price = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateBookRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<BookResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;
    let book: NewBook = json.into_inner().into();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(actor.user));
    span.record("book_uuid", tracing::field::display(book.uuid));
    span.record("price", book.price);

    let created = state
        .app
        .books
        .create_book(actor, book)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/books/{}", created.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(created.into()))
}
