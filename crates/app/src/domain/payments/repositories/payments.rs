//! Payments Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::{
    database::try_get_variant,
    domain::{
        orders::records::OrderUuid,
        payments::{
            data::{BillingDetails, NewPayment},
            records::{PaymentRecord, PaymentState, PaymentUuid},
        },
        users::records::UserUuid,
    },
};

const CREATE_PAYMENT_SQL: &str = include_str!("../sql/create_payment.sql");
const GET_PAYMENT_SQL: &str = include_str!("../sql/get_payment.sql");
const LOCK_PAYMENT_SQL: &str = include_str!("../sql/lock_payment.sql");
const LIST_PAYMENTS_SQL: &str = include_str!("../sql/list_payments.sql");
const LIST_USER_PAYMENTS_SQL: &str = include_str!("../sql/list_user_payments.sql");
const SET_PAYMENT_STATE_SQL: &str = include_str!("../sql/set_payment_state.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPaymentsRepository;

impl PgPaymentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Insert a payment. Card input never reaches this point; only `card_last_four` is bound.
    pub(crate) async fn create_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: Option<UserUuid>,
        payment: &NewPayment,
        card_last_four: Option<&str>,
    ) -> Result<PaymentRecord, sqlx::Error> {
        let billing = &payment.billing;

        query_as::<Postgres, PaymentRecord>(CREATE_PAYMENT_SQL)
            .bind(PaymentUuid::new().into_uuid())
            .bind(payment.order.into_uuid())
            .bind(user.map(UserUuid::into_uuid))
            .bind(payment.method.as_str())
            .bind(payment.status.as_str())
            .bind(payment.transaction_id.as_deref())
            .bind(&billing.first_name)
            .bind(&billing.last_name)
            .bind(&billing.country)
            .bind(&billing.street_address)
            .bind(&billing.town_city)
            .bind(&billing.state_county)
            .bind(&billing.postcode)
            .bind(&billing.phone)
            .bind(&billing.email)
            .bind(billing.order_notes.as_deref())
            .bind(card_last_four)
            .bind(payment.location.as_deref())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(GET_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn lock_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(LOCK_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_payments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<PaymentRecord>, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(LIST_PAYMENTS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_user_payments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<PaymentRecord>, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(LIST_USER_PAYMENTS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn set_state(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        state: PaymentState,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(SET_PAYMENT_STATE_SQL)
            .bind(payment.into_uuid())
            .bind(state.as_str())
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for PaymentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PaymentUuid::from_uuid(row.try_get("uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            user_uuid: row
                .try_get::<Option<Uuid>, _>("user_uuid")?
                .map(UserUuid::from_uuid),
            method: try_get_variant(row, "payment_method")?,
            status: try_get_variant(row, "payment_status")?,
            transaction_id: row.try_get("transaction_id")?,
            billing: BillingDetails {
                first_name: row.try_get("first_name")?,
                last_name: row.try_get("last_name")?,
                country: row.try_get("country")?,
                street_address: row.try_get("street_address")?,
                town_city: row.try_get("town_city")?,
                state_county: row.try_get("state_county")?,
                postcode: row.try_get("postcode")?,
                phone: row.try_get("phone")?,
                email: row.try_get("email")?,
                order_notes: row.try_get("order_notes")?,
            },
            card_last_four: row.try_get("card_last_four")?,
            location: row.try_get("location")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
