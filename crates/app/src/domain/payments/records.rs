//! Payment Records

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;

use crate::{
    domain::{
        UnknownVariant,
        orders::records::{OrderUuid, PaymentStatus},
        payments::data::BillingDetails,
        users::records::UserUuid,
    },
    uuids::TypedUuid,
};

/// Payment UUID
pub type PaymentUuid = TypedUuid<PaymentRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Card,
    Cash,
}

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Cash => "cash",
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "card" => Ok(Self::Card),
            "cash" => Ok(Self::Cash),
            _ => Err(UnknownVariant::new("payment method", value)),
        }
    }
}

/// Outcome of a single payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentState {
    Pending,
    Completed,
    Failed,
}

impl PaymentState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl Display for PaymentState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentState {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(UnknownVariant::new("payment state", value)),
        }
    }
}

/// Only a completed card payment marks its order as paid.
#[must_use]
pub const fn pays_order(method: PaymentMethod, state: PaymentState) -> bool {
    matches!((method, state), (PaymentMethod::Card, PaymentState::Completed))
}

/// Payment Record
///
/// `card_last_four` is the only card data ever stored.
#[derive(Debug, Clone)]
pub struct PaymentRecord {
    pub uuid: PaymentUuid,
    pub order_uuid: OrderUuid,
    pub user_uuid: Option<UserUuid>,
    pub method: PaymentMethod,
    pub status: PaymentState,
    pub transaction_id: Option<String>,
    pub billing: BillingDetails,
    pub card_last_four: Option<String>,
    pub location: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Seller Payment UUID
pub type SellerPaymentUuid = TypedUuid<SellerPaymentRecord>;

/// One seller's share of a payment.
#[derive(Debug, Clone)]
pub struct SellerPaymentRecord {
    pub uuid: SellerPaymentUuid,
    pub seller_uuid: UserUuid,
    pub order_uuid: OrderUuid,
    pub payment_uuid: PaymentUuid,
    pub amount: u64,
    pub created_at: Timestamp,
}

/// Everything written by recording a payment.
#[derive(Debug, Clone)]
pub struct RecordedPayment {
    pub payment: PaymentRecord,
    pub order_payment_status: PaymentStatus,
    pub settlements: Vec<SellerPaymentRecord>,
}
