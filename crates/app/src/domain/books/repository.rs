//! Books Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::{
    database::{amount_to_i64, try_get_amount, try_get_variant},
    domain::{
        books::{
            data::{BookUpdate, NewBook},
            records::{BookRecord, BookStatus, BookUuid},
        },
        categories::records::CategoryUuid,
        users::records::UserUuid,
    },
};

const LIST_BOOKS_SQL: &str = include_str!("sql/list_books.sql");
const LIST_ALL_BOOKS_SQL: &str = include_str!("sql/list_all_books.sql");
const LIST_SELLER_BOOKS_SQL: &str = include_str!("sql/list_seller_books.sql");
const GET_BOOK_SQL: &str = include_str!("sql/get_book.sql");
const LOCK_BOOK_SQL: &str = include_str!("sql/lock_book.sql");
const CREATE_BOOK_SQL: &str = include_str!("sql/create_book.sql");
const UPDATE_BOOK_SQL: &str = include_str!("sql/update_book.sql");
const SET_BOOK_STATUS_SQL: &str = include_str!("sql/set_book_status.sql");
const DECREMENT_STOCK_SQL: &str = include_str!("sql/decrement_stock.sql");
const DELETE_BOOK_SQL: &str = include_str!("sql/delete_book.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgBooksRepository;

impl PgBooksRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_books(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<BookRecord>, sqlx::Error> {
        query_as::<Postgres, BookRecord>(LIST_BOOKS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_all_books(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<BookRecord>, sqlx::Error> {
        query_as::<Postgres, BookRecord>(LIST_ALL_BOOKS_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_seller_books(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        seller: UserUuid,
    ) -> Result<Vec<BookRecord>, sqlx::Error> {
        query_as::<Postgres, BookRecord>(LIST_SELLER_BOOKS_SQL)
            .bind(seller.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_book(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book: BookUuid,
    ) -> Result<BookRecord, sqlx::Error> {
        query_as::<Postgres, BookRecord>(GET_BOOK_SQL)
            .bind(book.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Fetch the book and hold its row lock until the transaction ends.
    pub(crate) async fn lock_book(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book: BookUuid,
    ) -> Result<BookRecord, sqlx::Error> {
        query_as::<Postgres, BookRecord>(LOCK_BOOK_SQL)
            .bind(book.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_book(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        seller: UserUuid,
        book: &NewBook,
    ) -> Result<BookRecord, sqlx::Error> {
        query_as::<Postgres, BookRecord>(CREATE_BOOK_SQL)
            .bind(book.uuid.into_uuid())
            .bind(seller.into_uuid())
            .bind(book.category.into_uuid())
            .bind(&book.name)
            .bind(&book.author)
            .bind(&book.description)
            .bind(amount_to_i64(book.price, "price")?)
            .bind(amount_to_i64(book.stock, "stock")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_book(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book: BookUuid,
        update: &BookUpdate,
    ) -> Result<BookRecord, sqlx::Error> {
        query_as::<Postgres, BookRecord>(UPDATE_BOOK_SQL)
            .bind(book.into_uuid())
            .bind(update.category.into_uuid())
            .bind(&update.name)
            .bind(&update.author)
            .bind(&update.description)
            .bind(amount_to_i64(update.price, "price")?)
            .bind(amount_to_i64(update.stock, "stock")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book: BookUuid,
        status: BookStatus,
        reject_note: Option<&str>,
    ) -> Result<BookRecord, sqlx::Error> {
        query_as::<Postgres, BookRecord>(SET_BOOK_STATUS_SQL)
            .bind(book.into_uuid())
            .bind(status.as_str())
            .bind(reject_note)
            .fetch_one(&mut **tx)
            .await
    }

    /// Subtract `quantity` from stock, returning what is left. The `stock >= 0`
    /// check constraint rejects an oversell even if a caller skipped the lock.
    pub(crate) async fn decrement_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book: BookUuid,
        quantity: u64,
    ) -> Result<u64, sqlx::Error> {
        let remaining: i64 = query_scalar(DECREMENT_STOCK_SQL)
            .bind(book.into_uuid())
            .bind(amount_to_i64(quantity, "quantity")?)
            .fetch_one(&mut **tx)
            .await?;

        u64::try_from(remaining).map_err(|e| sqlx::Error::ColumnDecode {
            index: "stock".to_string(),
            source: Box::new(e),
        })
    }

    pub(crate) async fn delete_book(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        book: BookUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_BOOK_SQL)
            .bind(book.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for BookRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: BookUuid::from_uuid(row.try_get("uuid")?),
            seller_uuid: UserUuid::from_uuid(row.try_get("seller_uuid")?),
            category_uuid: CategoryUuid::from_uuid(row.try_get("category_uuid")?),
            name: row.try_get("name")?,
            author: row.try_get("author")?,
            description: row.try_get("description")?,
            price: try_get_amount(row, "price")?,
            stock: try_get_amount(row, "stock")?,
            status: try_get_variant(row, "status")?,
            reject_note: row.try_get("reject_note")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
