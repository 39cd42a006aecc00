//! Cart Data

use crate::domain::books::records::BookUuid;

/// New Cart Item Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    pub book: BookUuid,
    pub quantity: u64,
}

/// Cart Item Update Data
#[derive(Debug, Clone, PartialEq)]
pub struct CartItemUpdate {
    pub quantity: u64,
}
