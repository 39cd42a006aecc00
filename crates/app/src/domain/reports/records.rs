//! Report Records

use jiff::Timestamp;

use crate::domain::{
    books::records::BookUuid,
    orders::records::{OrderStatus, OrderUuid, PaymentStatus},
    payments::records::{PaymentMethod, PaymentState, PaymentUuid},
    users::records::UserUuid,
};

/// Name and email of the account that placed an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buyer {
    pub name: String,
    pub email: String,
}

/// A seller's lines within one order, with everything known about its payments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerSale {
    pub order_uuid: OrderUuid,
    /// `None` for guest orders and deleted accounts.
    pub buyer: Option<Buyer>,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub ordered_at: Timestamp,
    pub total_earned: u64,
    pub books: Vec<SoldBook>,
    pub payments: Vec<SalePayment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoldBook {
    pub book_uuid: BookUuid,
    pub name: String,
    pub quantity: u64,
    pub price: u64,
    pub line_total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalePayment {
    pub uuid: PaymentUuid,
    pub method: PaymentMethod,
    pub status: PaymentState,
    pub transaction_id: Option<String>,
    pub country: String,
    pub street_address: String,
    pub town_city: String,
    pub state_county: String,
    pub postcode: String,
    pub phone: String,
    pub order_notes: Option<String>,
}

/// One row of the admin order overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminOrderSummary {
    pub order_uuid: OrderUuid,
    pub user_uuid: Option<UserUuid>,
    pub buyer: Option<Buyer>,
    pub item_count: u64,
    pub total_price: u64,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: Timestamp,
}
