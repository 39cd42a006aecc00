//! Seller Settlements Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::{
    database::{amount_to_i64, try_get_amount},
    domain::{
        orders::records::OrderUuid,
        payments::{
            records::{PaymentUuid, SellerPaymentRecord, SellerPaymentUuid},
            settlement::{SellerShare, SettlementLine},
        },
        users::records::UserUuid,
    },
};

const LIST_SETTLEMENT_LINES_SQL: &str = include_str!("../sql/list_settlement_lines.sql");
const CREATE_SELLER_PAYMENT_SQL: &str = include_str!("../sql/create_seller_payment.sql");
const PAYMENT_IS_SETTLED_SQL: &str = include_str!("../sql/payment_is_settled.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgSettlementsRepository;

impl PgSettlementsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Order lines paired with the seller of each book.
    pub(crate) async fn list_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Vec<SettlementLine>, sqlx::Error> {
        query_as::<Postgres, SettlementLine>(LIST_SETTLEMENT_LINES_SQL)
            .bind(order.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn is_settled(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<bool, sqlx::Error> {
        query_scalar::<Postgres, bool>(PAYMENT_IS_SETTLED_SQL)
            .bind(payment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_seller_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        payment: PaymentUuid,
        share: SellerShare,
    ) -> Result<SellerPaymentRecord, sqlx::Error> {
        query_as::<Postgres, SellerPaymentRecord>(CREATE_SELLER_PAYMENT_SQL)
            .bind(SellerPaymentUuid::new().into_uuid())
            .bind(share.seller.into_uuid())
            .bind(order.into_uuid())
            .bind(payment.into_uuid())
            .bind(amount_to_i64(share.amount, "amount")?)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for SettlementLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            seller: UserUuid::from_uuid(row.try_get("seller_uuid")?),
            quantity: try_get_amount(row, "quantity")?,
            price: try_get_amount(row, "price")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for SellerPaymentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: SellerPaymentUuid::from_uuid(row.try_get("uuid")?),
            seller_uuid: UserUuid::from_uuid(row.try_get("seller_uuid")?),
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            payment_uuid: PaymentUuid::from_uuid(row.try_get("payment_uuid")?),
            amount: try_get_amount(row, "amount")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
