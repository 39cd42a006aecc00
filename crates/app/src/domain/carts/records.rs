//! Cart Records

use jiff::Timestamp;

use crate::{
    domain::{books::records::BookUuid, users::records::UserUuid},
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart Record
///
/// `subtotal` and `total` are computed from the items when the cart is read.
#[derive(Debug, Clone)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub user_uuid: UserUuid,
    pub subtotal: u64,
    pub total: u64,
    pub items: Vec<CartItemRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Cart Item UUID
pub type CartItemUuid = TypedUuid<CartItemRecord>;

/// Cart Item Record
///
/// `price` is the unit price captured when the line was last added or updated.
#[derive(Debug, Clone)]
pub struct CartItemRecord {
    pub uuid: CartItemUuid,
    pub cart_uuid: CartUuid,
    pub book_uuid: BookUuid,
    pub quantity: u64,
    pub price: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CartItemRecord {
    /// `quantity × price`, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<u64> {
        self.quantity.checked_mul(self.price)
    }
}
