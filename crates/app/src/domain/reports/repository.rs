//! Reports Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::{
    database::{try_get_amount, try_get_variant},
    domain::{
        books::records::BookUuid,
        orders::records::OrderUuid,
        payments::records::PaymentUuid,
        reports::{
            records::{AdminOrderSummary, Buyer, SalePayment},
            sales::{OrderPayment, SaleLine},
        },
        users::records::UserUuid,
    },
};

const LIST_SELLER_LINES_SQL: &str = include_str!("sql/list_seller_lines.sql");
const LIST_ORDER_PAYMENTS_SQL: &str = include_str!("sql/list_order_payments.sql");
const LIST_ADMIN_ORDERS_SQL: &str = include_str!("sql/list_admin_orders.sql");

#[derive(Debug, Clone, Default)]
pub(super) struct PgReportsRepository;

impl PgReportsRepository {
    #[must_use]
    pub(super) fn new() -> Self {
        Self
    }

    pub(super) async fn list_seller_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        seller: UserUuid,
    ) -> Result<Vec<SaleLine>, sqlx::Error> {
        query_as::<Postgres, SaleLine>(LIST_SELLER_LINES_SQL)
            .bind(seller.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(super) async fn list_order_payments(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &[OrderUuid],
    ) -> Result<Vec<OrderPayment>, sqlx::Error> {
        let uuids: Vec<Uuid> = orders.iter().map(|order| order.into_uuid()).collect();

        query_as::<Postgres, OrderPayment>(LIST_ORDER_PAYMENTS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await
    }

    pub(super) async fn list_admin_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<AdminOrderSummary>, sqlx::Error> {
        query_as::<Postgres, AdminOrderSummary>(LIST_ADMIN_ORDERS_SQL)
            .fetch_all(&mut **tx)
            .await
    }
}

/// Buyer columns are null together when the order has no surviving account.
fn try_get_buyer(row: &PgRow) -> sqlx::Result<Option<Buyer>> {
    let name: Option<String> = row.try_get("buyer_name")?;
    let email: Option<String> = row.try_get("buyer_email")?;

    Ok(name.zip(email).map(|(name, email)| Buyer { name, email }))
}

impl<'r> FromRow<'r, PgRow> for SaleLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            order_status: try_get_variant(row, "order_status")?,
            payment_status: try_get_variant(row, "payment_status")?,
            ordered_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            buyer: try_get_buyer(row)?,
            book_uuid: BookUuid::from_uuid(row.try_get("book_uuid")?),
            book_name: row.try_get("book_name")?,
            quantity: try_get_amount(row, "quantity")?,
            price: try_get_amount(row, "price")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderPayment {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            payment: SalePayment {
                uuid: PaymentUuid::from_uuid(row.try_get("uuid")?),
                method: try_get_variant(row, "payment_method")?,
                status: try_get_variant(row, "payment_status")?,
                transaction_id: row.try_get("transaction_id")?,
                country: row.try_get("country")?,
                street_address: row.try_get("street_address")?,
                town_city: row.try_get("town_city")?,
                state_county: row.try_get("state_county")?,
                postcode: row.try_get("postcode")?,
                phone: row.try_get("phone")?,
                order_notes: row.try_get("order_notes")?,
            },
        })
    }
}

impl<'r> FromRow<'r, PgRow> for AdminOrderSummary {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            order_uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: row
                .try_get::<Option<Uuid>, _>("user_uuid")?
                .map(UserUuid::from_uuid),
            buyer: try_get_buyer(row)?,
            item_count: try_get_amount(row, "item_count")?,
            total_price: try_get_amount(row, "total_price")?,
            order_status: try_get_variant(row, "order_status")?,
            payment_status: try_get_variant(row, "payment_status")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
