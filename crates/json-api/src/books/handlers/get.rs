//! Get Book Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookstore_app::domain::books::records::BookRecord;

use crate::{books::errors::into_status_error, extensions::*, state::State};

/// Book Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BookResponse {
    /// The unique identifier of the book
    pub uuid: Uuid,

    /// The seller who listed the book
    pub seller_uuid: Uuid,

    /// The category the book is filed under
    pub category_uuid: Uuid,

    /// Title
    pub name: String,

    /// Author
    pub author: String,

    /// Free-form description
    pub description: String,

    /// Unit price in cents
    pub price: u64,

    /// Copies currently in stock
    pub stock: u64,

    /// Moderation state (pending, approved, disapproved)
    pub status: String,

    /// Moderator's note when the listing was rejected
    pub reject_note: Option<String>,

    /// The date and time the book was listed
    pub created_at: String,

    /// The date and time the book was last updated
    pub updated_at: String,
}

impl From<BookRecord> for BookResponse {
    fn from(book: BookRecord) -> Self {
        Self {
            uuid: book.uuid.into_uuid(),
            seller_uuid: book.seller_uuid.into_uuid(),
            category_uuid: book.category_uuid.into_uuid(),
            name: book.name,
            author: book.author,
            description: book.description,
            price: book.price,
            stock: book.stock,
            status: book.status.to_string(),
            reject_note: book.reject_note,
            created_at: book.created_at.to_string(),
            updated_at: book.updated_at.to_string(),
        }
    }
}

/// Get Book Handler
#[endpoint(
    tags("books"),
    summary = "Get Book",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Book found"),
        (status_code = StatusCode::NOT_FOUND, description = "Book not found"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "books.get", skip(book, depot), err)]
pub(crate) async fn handler(
    book: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<BookResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    depot.actor_or_401()?;

    let book = state
        .app
        .books
        .get_book(book.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(book.into()))
}
