//! Record Payment Handler

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookstore_app::domain::payments::{
    data::{BillingDetails, CardDetails, NewPayment},
    records::{PaymentMethod, PaymentState, RecordedPayment, SellerPaymentRecord},
};

use crate::{
    extensions::*,
    observability::observe_payment,
    payments::{errors::into_status_error, handlers::PaymentResponse},
    state::State,
};

/// Card Request
#[derive(Deserialize, ToSchema)]
pub(crate) struct CardRequest {
    pub number: String,
    pub expiry: String,
    pub cvc: String,
}

impl Debug for CardRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("CardRequest(<redacted>)")
    }
}

/// Record Payment Request
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CreatePaymentRequest {
    pub order_uuid: Uuid,
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
    /// Required for card payments, ignored for cash
    pub card: Option<CardRequest>,
    pub location: Option<String>,
}

impl CreatePaymentRequest {
    fn into_new_payment(self) -> Result<NewPayment, StatusError> {
        let method: PaymentMethod = self.method.parse().map_err(unprocessable)?;
        let status: PaymentState = self.status.parse().map_err(unprocessable)?;

        Ok(NewPayment {
            order: self.order_uuid.into(),
            method,
            status,
            transaction_id: self.transaction_id,
            billing: BillingDetails {
                first_name: self.first_name,
                last_name: self.last_name,
                country: self.country,
                street_address: self.street_address,
                town_city: self.town_city,
                state_county: self.state_county,
                postcode: self.postcode,
                phone: self.phone,
                email: self.email,
                order_notes: self.order_notes,
            },
            card: self.card.map(|card| CardDetails {
                number: card.number,
                expiry: card.expiry,
                cvc: card.cvc,
            }),
            location: self.location,
        })
    }
}

fn unprocessable(error: impl std::fmt::Display) -> StatusError {
    StatusError::unprocessable_entity()
        .brief("Invalid payment")
        .detail(error.to_string())
}

/// Seller Settlement Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct SettlementResponse {
    pub uuid: Uuid,
    pub seller_uuid: Uuid,
    /// Seller's share in cents
    pub amount: u64,
}

impl From<SellerPaymentRecord> for SettlementResponse {
    fn from(settlement: SellerPaymentRecord) -> Self {
        Self {
            uuid: settlement.uuid.into_uuid(),
            seller_uuid: settlement.seller_uuid.into_uuid(),
            amount: settlement.amount,
        }
    }
}

/// Recorded Payment Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RecordedPaymentResponse {
    pub payment: PaymentResponse,
    /// The order's payment status after this payment
    pub order_payment_status: String,
    pub settlements: Vec<SettlementResponse>,
}

impl From<RecordedPayment> for RecordedPaymentResponse {
    fn from(recorded: RecordedPayment) -> Self {
        Self {
            payment: recorded.payment.into(),
            order_payment_status: recorded.order_payment_status.to_string(),
            settlements: recorded.settlements.into_iter().map(Into::into).collect(),
        }
    }
}

/// Record Payment Handler
///
/// Guests may pay without a token. A completed card payment marks the order
/// paid, and every payment splits the order among its sellers.
#[endpoint(
    tags("payments"),
    summary = "Record Payment",
    responses(
        (status_code = StatusCode::CREATED, description = "Payment recorded"),
        (status_code = StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid payment details"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Payment already settled"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "payments.create",
    skip(json, depot, res),
    fields(
        user_uuid = tracing::field::Empty,
        order_uuid = tracing::field::Empty,
        payment_uuid = tracing::field::Empty,
        method = tracing::field::Empty,
        status = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreatePaymentRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<RecordedPaymentResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.optional_actor();
    let payment = json.into_inner().into_new_payment()?;

    let span = tracing::Span::current();

    if let Some(actor) = actor {
        span.record("user_uuid", tracing::field::display(actor.user));
    }

    span.record("order_uuid", tracing::field::display(payment.order));
    span.record("method", payment.method.as_str());
    span.record("status", payment.status.as_str());

    let (method, status) = (payment.method, payment.status);

    let recorded = state
        .app
        .payments
        .record_payment(actor, payment)
        .await
        .map_err(into_status_error)?;

    observe_payment(method, status);

    span.record("payment_uuid", tracing::field::display(recorded.payment.uuid));

    res.add_header(LOCATION, format!("/payments/{}", recorded.payment.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(recorded.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use bookstore_app::domain::{
        orders::records::{OrderUuid, PaymentStatus},
        payments::{
            MockPaymentsService, PaymentsServiceError,
            records::{PaymentUuid, SellerPaymentUuid},
            validation::validate_payment,
        },
        users::records::UserUuid,
    };
    use jiff::Timestamp;

    use crate::test_helpers::{TEST_CUSTOMER, TestState, service_as, service_with_state};

    use super::{super::tests::make_payment, *};

    fn route() -> Router {
        Router::with_path("payments").post(handler)
    }

    fn card_payment_body(order: OrderUuid) -> Value {
        json!({
            "order_uuid": order.into_uuid(),
            "method": "card",
            "status": "completed",
            "transaction_id": "txn_123",
            "first_name": "Ada",
            "last_name": "Lovelace",
            "country": "UK",
            "street_address": "12 St James's Square",
            "town_city": "London",
            "state_county": "Westminster",
            "postcode": "SW1Y 4JH",
            "phone": "+44 20 7946 0000",
            "email": "ada@example.com",
            "card": {
                "number": "4242 4242 4242 4242",
                "expiry": "12/30",
                "cvc": "123"
            }
        })
    }

    fn settlement(order: OrderUuid, payment: PaymentUuid, amount: u64) -> SellerPaymentRecord {
        SellerPaymentRecord {
            uuid: SellerPaymentUuid::new(),
            seller_uuid: UserUuid::new(),
            order_uuid: order,
            payment_uuid: payment,
            amount,
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn records_card_payment_with_settlements() -> TestResult {
        let order = OrderUuid::new();
        let uuid = PaymentUuid::new();

        let mut payments = MockPaymentsService::new();

        payments
            .expect_record_payment()
            .once()
            .withf(move |actor, payment| {
                *actor == Some(TEST_CUSTOMER)
                    && payment.order == order
                    && payment.method == PaymentMethod::Card
                    && payment.status == PaymentState::Completed
                    && payment.card.is_some()
            })
            .return_once(move |_, _| {
                Ok(RecordedPayment {
                    payment: make_payment(
                        uuid,
                        order,
                        Some(TEST_CUSTOMER.user),
                        PaymentMethod::Card,
                        PaymentState::Completed,
                    ),
                    order_payment_status: PaymentStatus::Paid,
                    settlements: vec![
                        settlement(order, uuid, 6_000),
                        settlement(order, uuid, 4_000),
                    ],
                })
            });

        let mut res = TestClient::post("http://example.com/payments")
            .json(&card_payment_body(order))
            .send(&service_as(
                TEST_CUSTOMER,
                TestState::new().payments(payments),
                route(),
            ))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        let body: Value = res.take_json().await?;

        assert_eq!(body["order_payment_status"], "paid");
        assert_eq!(body["payment"]["card_last_four"], "4242");
        assert_eq!(
            body["settlements"]
                .as_array()
                .map(|s| s.iter().filter_map(|s| s["amount"].as_u64()).sum::<u64>()),
            Some(10_000)
        );
        assert!(
            !body.to_string().contains("4242 4242"),
            "full card number must never be echoed"
        );
        assert!(body["payment"].get("cvc").is_none());

        Ok(())
    }

    #[tokio::test]
    async fn guests_pay_without_a_token() -> TestResult {
        let order = OrderUuid::new();

        let mut payments = MockPaymentsService::new();

        payments
            .expect_record_payment()
            .once()
            .withf(|actor, _| actor.is_none())
            .return_once(move |_, _| {
                Ok(RecordedPayment {
                    payment: make_payment(
                        PaymentUuid::new(),
                        order,
                        None,
                        PaymentMethod::Card,
                        PaymentState::Completed,
                    ),
                    order_payment_status: PaymentStatus::Paid,
                    settlements: Vec::new(),
                })
            });

        let mut res = TestClient::post("http://example.com/payments")
            .json(&card_payment_body(order))
            .send(&service_with_state(TestState::new().payments(payments), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        let body: RecordedPaymentResponse = res.take_json().await?;

        assert_eq!(body.payment.user_uuid, None);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_method_is_422_without_calling_service() {
        let mut body = card_payment_body(OrderUuid::new());

        body["method"] = json!("paypal");

        let res = TestClient::post("http://example.com/payments")
            .json(&body)
            .send(&service_with_state(TestState::new(), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));
    }

    #[tokio::test]
    async fn validation_failures_are_422() {
        let invalid = NewPayment {
            order: OrderUuid::new(),
            method: PaymentMethod::Cash,
            status: PaymentState::Pending,
            transaction_id: None,
            billing: BillingDetails::default(),
            card: None,
            location: None,
        };

        let mut payments = MockPaymentsService::new();

        payments.expect_record_payment().once().return_once(move |_, _| {
            Err(validate_payment(&invalid).map_or_else(
                PaymentsServiceError::Validation,
                |_| PaymentsServiceError::InvalidData,
            ))
        });

        let res = TestClient::post("http://example.com/payments")
            .json(&card_payment_body(OrderUuid::new()))
            .send(&service_with_state(TestState::new().payments(payments), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNPROCESSABLE_ENTITY));
    }

    #[tokio::test]
    async fn unknown_order_is_404() {
        let mut payments = MockPaymentsService::new();

        payments
            .expect_record_payment()
            .once()
            .return_once(|_, _| Err(PaymentsServiceError::NotFound));

        let res = TestClient::post("http://example.com/payments")
            .json(&card_payment_body(OrderUuid::new()))
            .send(&service_with_state(TestState::new().payments(payments), route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn card_request_debug_is_redacted() {
        let card = CardRequest {
            number: "4242424242424242".to_string(),
            expiry: "12/30".to_string(),
            cvc: "123".to_string(),
        };

        assert!(!format!("{card:?}").contains("4242"));
    }
}
