//! Cart Item Handlers

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookstore_app::domain::carts::records::CartItemRecord;

pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod update;

/// Cart Item Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartLineResponse {
    /// The unique identifier of the cart item
    pub uuid: Uuid,

    /// The book on this line
    pub book_uuid: Uuid,

    /// Merged quantity on the line
    pub quantity: u64,

    /// Refreshed unit price in cents
    pub price: u64,
}

impl From<CartItemRecord> for CartLineResponse {
    fn from(item: CartItemRecord) -> Self {
        Self {
            uuid: item.uuid.into_uuid(),
            book_uuid: item.book_uuid.into_uuid(),
            quantity: item.quantity,
            price: item.price,
        }
    }
}
