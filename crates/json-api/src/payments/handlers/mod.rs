//! Payment Handlers

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookstore_app::domain::payments::records::PaymentRecord;

pub(crate) mod create;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod mine;
pub(crate) mod status;

/// Payment Response
///
/// Card data is limited to the last four digits.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentResponse {
    pub uuid: Uuid,
    pub order_uuid: Uuid,
    /// Absent for guest payments
    pub user_uuid: Option<Uuid>,
    /// card or cash
    pub method: String,
    /// pending, completed or failed
    pub status: String,
    pub transaction_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub street_address: String,
    pub town_city: String,
    pub state_county: String,
    pub postcode: String,
    pub phone: String,
    pub email: String,
    pub order_notes: Option<String>,
    pub card_last_four: Option<String>,
    pub location: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PaymentRecord> for PaymentResponse {
    fn from(payment: PaymentRecord) -> Self {
        let billing = payment.billing;

        Self {
            uuid: payment.uuid.into_uuid(),
            order_uuid: payment.order_uuid.into_uuid(),
            user_uuid: payment.user_uuid.map(Into::into),
            method: payment.method.to_string(),
            status: payment.status.to_string(),
            transaction_id: payment.transaction_id,
            first_name: billing.first_name,
            last_name: billing.last_name,
            country: billing.country,
            street_address: billing.street_address,
            town_city: billing.town_city,
            state_county: billing.state_county,
            postcode: billing.postcode,
            phone: billing.phone,
            email: billing.email,
            order_notes: billing.order_notes,
            card_last_four: payment.card_last_four,
            location: payment.location,
            created_at: payment.created_at.to_string(),
            updated_at: payment.updated_at.to_string(),
        }
    }
}
