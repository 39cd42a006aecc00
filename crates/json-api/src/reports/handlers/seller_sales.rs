//! Seller Sales Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookstore_app::domain::reports::records::{Buyer, SalePayment, SellerSale, SoldBook};

use crate::{extensions::*, reports::errors::into_status_error, state::State};

/// Buyer Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BuyerResponse {
    pub name: String,
    pub email: String,
}

impl From<Buyer> for BuyerResponse {
    fn from(buyer: Buyer) -> Self {
        Self {
            name: buyer.name,
            email: buyer.email,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SoldBookResponse {
    pub book_uuid: Uuid,
    pub name: String,
    pub quantity: u64,
    pub price: u64,
    pub line_total: u64,
}

impl From<SoldBook> for SoldBookResponse {
    fn from(book: SoldBook) -> Self {
        Self {
            book_uuid: book.book_uuid.into_uuid(),
            name: book.name,
            quantity: book.quantity,
            price: book.price,
            line_total: book.line_total,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SalePaymentResponse {
    pub uuid: Uuid,
    pub method: String,
    pub status: String,
    pub transaction_id: Option<String>,
    pub country: String,
    pub street_address: String,
    pub town_city: String,
    pub state_county: String,
    pub postcode: String,
    pub phone: String,
    pub order_notes: Option<String>,
}

impl From<SalePayment> for SalePaymentResponse {
    fn from(payment: SalePayment) -> Self {
        Self {
            uuid: payment.uuid.into_uuid(),
            method: payment.method.to_string(),
            status: payment.status.to_string(),
            transaction_id: payment.transaction_id,
            country: payment.country,
            street_address: payment.street_address,
            town_city: payment.town_city,
            state_county: payment.state_county,
            postcode: payment.postcode,
            phone: payment.phone,
            order_notes: payment.order_notes,
        }
    }
}

/// Seller Sale Response
///
/// One order as seen by a seller: only their own lines and what they earned.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SellerSaleResponse {
    pub order_uuid: Uuid,
    /// Absent for guest orders and deleted accounts
    pub buyer: Option<BuyerResponse>,
    pub order_status: String,
    pub payment_status: String,
    pub ordered_at: String,
    /// Sum of the seller's line totals in cents
    pub total_earned: u64,
    pub books: Vec<SoldBookResponse>,
    pub payments: Vec<SalePaymentResponse>,
}

impl From<SellerSale> for SellerSaleResponse {
    fn from(sale: SellerSale) -> Self {
        Self {
            order_uuid: sale.order_uuid.into_uuid(),
            buyer: sale.buyer.map(Into::into),
            order_status: sale.order_status.to_string(),
            payment_status: sale.payment_status.to_string(),
            ordered_at: sale.ordered_at.to_string(),
            total_earned: sale.total_earned,
            books: sale.books.into_iter().map(Into::into).collect(),
            payments: sale.payments.into_iter().map(Into::into).collect(),
        }
    }
}

/// Seller Sales Handler
#[endpoint(
    tags("reports"),
    summary = "Seller Sales",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Caller's sales grouped per order"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not a seller or admin"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "reports.seller_sales",
    skip(depot),
    fields(user_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    depot: &mut Depot,
) -> Result<Json<Vec<SellerSaleResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    tracing::Span::current().record("user_uuid", tracing::field::display(actor.user));

    let sales = state
        .app
        .reports
        .seller_sales(actor)
        .await
        .map_err(into_status_error)?;

    Ok(Json(sales.into_iter().map(Into::into).collect()))
}
