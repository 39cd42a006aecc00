//! Test Helpers

use sqlx::query_scalar;
use testresult::TestResult;

use crate::{
    database::amount_to_i64,
    domain::{
        books::{BooksService, data::NewBook, records::BookUuid},
        carts::{CartsService, CartsServiceError, data::NewCartItem, records::CartItemRecord},
        categories::{CategoriesService, data::NewCategory, records::CategoryUuid},
        orders::{OrdersService, records::{OrderRecord, OrderUuid}},
        payments::{
            data::{BillingDetails, CardDetails, NewPayment},
            records::{PaymentMethod, PaymentState},
        },
        users::{
            UsersService,
            data::NewUser,
            records::{Actor, Role, UserUuid},
        },
    },
    test::TestContext,
};

pub(crate) fn billing_details() -> BillingDetails {
    BillingDetails {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        country: "United Kingdom".to_string(),
        street_address: "12 St James's Square".to_string(),
        town_city: "London".to_string(),
        state_county: "Greater London".to_string(),
        postcode: "SW1Y 4JH".to_string(),
        phone: "+44 20 7946 0000".to_string(),
        email: "ada@example.com".to_string(),
        order_notes: None,
    }
}

pub(crate) fn card_details(number: &str) -> CardDetails {
    CardDetails {
        number: number.to_string(),
        expiry: "12/30".to_string(),
        cvc: "123".to_string(),
    }
}

impl TestContext {
    pub(crate) async fn create_actor(&self, role: Role) -> Actor {
        let uuid = UserUuid::new();

        let user = self
            .users
            .create_user(NewUser {
                uuid,
                name: format!("{role} {uuid}"),
                email: format!("{uuid}@example.com"),
                role,
            })
            .await
            .expect("Failed to create test user");

        Actor::new(user.uuid, user.role)
    }

    pub(crate) async fn delete_user(&self, user: UserUuid) {
        sqlx::query("DELETE FROM users WHERE uuid = $1")
            .bind(user.into_uuid())
            .execute(self.db.pool())
            .await
            .expect("Failed to delete test user");
    }

    pub(crate) async fn create_category(&self, name: &str) -> CategoryUuid {
        self.categories
            .create_category(
                self.admin,
                NewCategory {
                    uuid: CategoryUuid::new(),
                    name: name.to_string(),
                },
            )
            .await
            .expect("Failed to create test category")
            .uuid
    }

    /// Create a book in a fresh category and approve it for sale.
    pub(crate) async fn create_book(&self, seller: Actor, price: u64, stock: u64) -> BookUuid {
        let category = self
            .create_category(&format!("Category {}", CategoryUuid::new()))
            .await;

        let book = self
            .books
            .create_book(
                seller,
                NewBook {
                    uuid: BookUuid::new(),
                    category,
                    name: "The Left Hand of Darkness".to_string(),
                    author: "Ursula K. Le Guin".to_string(),
                    description: String::new(),
                    price,
                    stock,
                },
            )
            .await
            .expect("Failed to create test book");

        self.books
            .approve_book(self.admin, book.uuid)
            .await
            .expect("Failed to approve test book");

        book.uuid
    }

    pub(crate) async fn book_stock(&self, book: BookUuid) -> u64 {
        let stock: i64 = query_scalar("SELECT stock FROM books WHERE uuid = $1")
            .bind(book.into_uuid())
            .fetch_one(self.db.pool())
            .await
            .expect("Failed to read book stock");

        u64::try_from(stock).expect("stock is never negative")
    }

    /// Overwrite stock directly, bypassing moderation.
    pub(crate) async fn set_book_stock(&self, book: BookUuid, stock: u64) {
        sqlx::query("UPDATE books SET stock = $2 WHERE uuid = $1")
            .bind(book.into_uuid())
            .bind(amount_to_i64(stock, "stock").expect("stock fits in BIGINT"))
            .execute(self.db.pool())
            .await
            .expect("Failed to set book stock");
    }

    pub(crate) async fn add_to_cart(
        &self,
        actor: Actor,
        book: BookUuid,
        quantity: u64,
    ) -> Result<CartItemRecord, CartsServiceError> {
        self.carts
            .add_item(actor, NewCartItem { book, quantity })
            .await
    }

    pub(crate) async fn cart_line_count(&self, actor: Actor) -> i64 {
        query_scalar(
            "SELECT COUNT(*) FROM cart_items \
             JOIN carts ON carts.uuid = cart_items.cart_uuid \
             WHERE carts.user_uuid = $1",
        )
        .bind(actor.user.into_uuid())
        .fetch_one(self.db.pool())
        .await
        .expect("Failed to count cart lines")
    }

    /// Fill the actor's cart with `lines` and place an order from it.
    pub(crate) async fn checkout(
        &self,
        actor: Actor,
        lines: &[(BookUuid, u64)],
    ) -> TestResult<OrderRecord> {
        for &(book, quantity) in lines {
            self.add_to_cart(actor, book, quantity).await?;
        }

        Ok(self.orders.place_order(actor).await?)
    }

    pub(crate) fn new_payment(
        &self,
        order: OrderUuid,
        method: PaymentMethod,
        status: PaymentState,
    ) -> NewPayment {
        NewPayment {
            order,
            method,
            status,
            transaction_id: None,
            billing: billing_details(),
            card: None,
            location: None,
        }
    }

    pub(crate) async fn order_count(&self) -> i64 {
        self.count("SELECT COUNT(*) FROM orders").await
    }

    pub(crate) async fn payment_count(&self) -> i64 {
        self.count("SELECT COUNT(*) FROM payments").await
    }

    pub(crate) async fn settlement_count(&self) -> i64 {
        self.count("SELECT COUNT(*) FROM seller_payments").await
    }

    async fn count(&self, sql: &'static str) -> i64 {
        query_scalar(sql)
            .fetch_one(self.db.pool())
            .await
            .expect("Failed to count rows")
    }
}
