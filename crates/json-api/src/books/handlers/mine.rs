//! List Own Books Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    books::{errors::into_status_error, handlers::get::BookResponse},
    extensions::*,
    state::State,
};

/// List Own Books Handler
///
/// The calling seller's inventory with its moderation state and any reject note.
#[endpoint(
    tags("books"),
    summary = "List Own Books",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Caller's listings"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not a seller"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "books.mine", skip(depot), err)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<BookResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let books = state
        .app
        .books
        .list_seller_books(actor)
        .await
        .map_err(into_status_error)?;

    Ok(Json(books.into_iter().map(Into::into).collect()))
}
