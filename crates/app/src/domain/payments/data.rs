//! Payment Data

use std::fmt::{Debug, Formatter, Result as FmtResult};

use zeroize::Zeroize;

use crate::domain::{
    orders::records::OrderUuid,
    payments::records::{PaymentMethod, PaymentState},
};

/// Buyer and shipping details supplied with a payment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillingDetails {
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
}

/// Raw card input. Wiped on drop and never printed.
#[derive(Clone, Default)]
pub struct CardDetails {
    pub number: String,
    pub expiry: String,
    pub cvc: String,
}

impl Debug for CardDetails {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("CardDetails(<redacted>)")
    }
}

impl Drop for CardDetails {
    fn drop(&mut self) {
        self.number.zeroize();
        self.expiry.zeroize();
        self.cvc.zeroize();
    }
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order: OrderUuid,
    pub method: PaymentMethod,
    pub status: PaymentState,
    pub transaction_id: Option<String>,
    pub billing: BillingDetails,
    pub card: Option<CardDetails>,
    pub location: Option<String>,
}
