//! Orders service: checkout and the order lifecycle.

use std::collections::HashMap;

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::{
        books::repository::PgBooksRepository,
        carts::repositories::{PgCartItemsRepository, PgCartsRepository},
        orders::{
            checkout::{find_shortfall, order_total},
            errors::OrdersServiceError,
            lifecycle::{TransitionPolicy, TransitionRejection},
            records::{OrderItemRecord, OrderRecord, OrderStatus, OrderUuid},
            repositories::{PgOrderItemsRepository, PgOrdersRepository},
        },
        users::records::Actor,
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    policy: TransitionPolicy,
    orders: PgOrdersRepository,
    items: PgOrderItemsRepository,
    carts: PgCartsRepository,
    cart_items: PgCartItemsRepository,
    books: PgBooksRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, policy: TransitionPolicy) -> Self {
        Self {
            db,
            policy,
            orders: PgOrdersRepository::new(),
            items: PgOrderItemsRepository::new(),
            carts: PgCartsRepository::new(),
            cart_items: PgCartItemsRepository::new(),
            books: PgBooksRepository::new(),
        }
    }

    #[must_use]
    pub fn transition_policy(&self) -> TransitionPolicy {
        self.policy
    }

    async fn with_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut order: OrderRecord,
    ) -> Result<OrderRecord, OrdersServiceError> {
        order.items = self.items.list_items(tx, &[order.uuid]).await?;

        Ok(order)
    }
}

/// Owners may always see and move their orders; sellers and admins may act on any order.
fn can_manage(actor: Actor, order: &OrderRecord) -> bool {
    actor.is_staff() || actor.owns(order.user_uuid)
}

fn attach_items(orders: &mut [OrderRecord], items: Vec<OrderItemRecord>) {
    let positions: HashMap<OrderUuid, usize> = orders
        .iter()
        .enumerate()
        .map(|(position, order)| (order.uuid, position))
        .collect();

    for item in items {
        if let Some(order) = positions
            .get(&item.order_uuid)
            .and_then(|&position| orders.get_mut(position))
        {
            order.items.push(item);
        }
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    #[tracing::instrument(
        name = "orders.service.place_order",
        skip_all,
        fields(
            user_uuid = %actor.user,
            order_uuid = tracing::field::Empty,
            line_count = tracing::field::Empty
        ),
        err
    )]
    async fn place_order(&self, actor: Actor) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self
            .carts
            .lock_cart(&mut tx, actor.user)
            .await?
            .ok_or(OrdersServiceError::EmptyCart)?;

        // Lines come back sorted by book uuid, so book locks are always taken in
        // the same order across concurrent checkouts.
        let lines = self.cart_items.lock_cart_items(&mut tx, cart.uuid).await?;

        if lines.is_empty() {
            return Err(OrdersServiceError::EmptyCart);
        }

        Span::current().record("line_count", tracing::field::display(lines.len()));

        let mut books = Vec::with_capacity(lines.len());

        for line in &lines {
            books.push(self.books.lock_book(&mut tx, line.book_uuid).await?);
        }

        if let Some(shortfall) = find_shortfall(&lines, &books) {
            return Err(OrdersServiceError::InsufficientStock {
                book: shortfall.book,
                available: shortfall.available,
            });
        }

        let total = order_total(&lines).ok_or(OrdersServiceError::InvalidData)?;

        let mut order = self.orders.create_order(&mut tx, actor.user, total).await?;

        Span::current().record("order_uuid", tracing::field::display(order.uuid));

        for line in &lines {
            let item = self
                .items
                .create_item(&mut tx, order.uuid, line.book_uuid, line.quantity, line.price)
                .await?;

            self.books
                .decrement_stock(&mut tx, line.book_uuid, line.quantity)
                .await?;

            order.items.push(item);
        }

        self.cart_items.clear_items(&mut tx, cart.uuid).await?;

        tx.commit().await?;

        info!(order_uuid = %order.uuid, total_price = order.total_price, "placed order");

        Ok(order)
    }

    async fn list_orders(&self, actor: Actor) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let mut orders = self.orders.list_user_orders(&mut tx, actor.user).await?;

        let uuids: Vec<OrderUuid> = orders.iter().map(|order| order.uuid).collect();
        let items = self.items.list_items(&mut tx, &uuids).await?;

        tx.commit().await?;

        attach_items(&mut orders, items);

        Ok(orders)
    }

    async fn get_order(
        &self,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let order = self.orders.get_order(&mut tx, order).await?;

        if !can_manage(actor, &order) {
            return Err(OrdersServiceError::Unauthorized);
        }

        let order = self.with_items(&mut tx, order).await?;

        tx.commit().await?;

        Ok(order)
    }

    #[tracing::instrument(
        name = "orders.service.update_status",
        skip_all,
        fields(user_uuid = %actor.user, order_uuid = %order, status = %status),
        err
    )]
    async fn update_status(
        &self,
        actor: Actor,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.orders.lock_order(&mut tx, order).await?;

        if !can_manage(actor, &current) {
            return Err(OrdersServiceError::Unauthorized);
        }

        let from = current.order_status;

        self.policy.check(from, status).map_err(|rejection| match rejection {
            TransitionRejection::AlreadyFinal => OrdersServiceError::OrderAlreadyFinal(from),
            TransitionRejection::NotASuccessor => {
                OrdersServiceError::InvalidTransition { from, to: status }
            }
        })?;

        let updated = if from == status {
            current
        } else {
            self.orders.set_order_status(&mut tx, order, status).await?
        };

        let updated = self.with_items(&mut tx, updated).await?;

        tx.commit().await?;

        info!(from = %from, to = %status, "updated order status");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "orders.service.cancel_order",
        skip_all,
        fields(user_uuid = %actor.user, order_uuid = %order),
        err
    )]
    async fn cancel_order(
        &self,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.orders.lock_order(&mut tx, order).await?;

        if !actor.owns(current.user_uuid) {
            return Err(OrdersServiceError::Unauthorized);
        }

        if current.order_status.is_terminal() {
            return Err(OrdersServiceError::OrderAlreadyFinal(current.order_status));
        }

        if current.order_status != OrderStatus::Pending {
            return Err(OrdersServiceError::NotPending);
        }

        // Stock is not returned to the books.
        let canceled = self
            .orders
            .set_order_status(&mut tx, order, OrderStatus::Canceled)
            .await?;

        let canceled = self.with_items(&mut tx, canceled).await?;

        tx.commit().await?;

        info!("canceled order");

        Ok(canceled)
    }

    #[tracing::instrument(
        name = "orders.service.delete_order",
        skip_all,
        fields(user_uuid = %actor.user, order_uuid = %order),
        err
    )]
    async fn delete_order(&self, actor: Actor, order: OrderUuid) -> Result<(), OrdersServiceError> {
        if !actor.is_admin() {
            return Err(OrdersServiceError::Unauthorized);
        }

        let mut tx = self.db.begin().await?;

        let current = self.orders.lock_order(&mut tx, order).await?;

        if !matches!(
            current.order_status,
            OrderStatus::Pending | OrderStatus::Canceled
        ) {
            return Err(OrdersServiceError::NotDeletable);
        }

        self.items.delete_items(&mut tx, order).await?;

        let rows_affected = self.orders.delete_order(&mut tx, order).await?;

        if rows_affected == 0 {
            return Err(OrdersServiceError::NotFound);
        }

        tx.commit().await?;

        info!("deleted order");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Turn the caller's cart into a pending, unpaid order in one transaction.
    ///
    /// Every line is checked against the book's live stock before anything is
    /// written; stock is then decremented and the cart emptied.
    async fn place_order(&self, actor: Actor) -> Result<OrderRecord, OrdersServiceError>;

    /// The caller's own orders with their items, newest first.
    async fn list_orders(&self, actor: Actor) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Retrieve a single order. Only its owner, sellers and admins may see it.
    async fn get_order(
        &self,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Move an order to `status`, subject to the configured transition policy.
    async fn update_status(
        &self,
        actor: Actor,
        order: OrderUuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Cancel one of the caller's own pending orders.
    async fn cancel_order(
        &self,
        actor: Actor,
        order: OrderUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Delete a pending or canceled order and its items. Admin only.
    async fn delete_order(&self, actor: Actor, order: OrderUuid) -> Result<(), OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{carts::CartsService, orders::records::PaymentStatus, users::records::Role},
        test::TestContext,
    };

    use super::*;

    #[tokio::test]
    async fn place_order_snapshots_total_and_decrements_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;
        let customer = ctx.create_actor(Role::Customer).await;
        let book_a = ctx.create_book(seller, 1_000, 5).await;
        let book_b = ctx.create_book(seller, 500, 5).await;

        ctx.add_to_cart(customer, book_a, 2).await?;
        ctx.add_to_cart(customer, book_b, 1).await?;

        let order = ctx.orders.place_order(customer).await?;

        assert_eq!(order.total_price, 2_500);
        assert_eq!(order.order_status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        assert_eq!(order.user_uuid, Some(customer.user));
        assert_eq!(order.items.len(), 2);

        assert_eq!(ctx.book_stock(book_a).await, 3);
        assert_eq!(ctx.book_stock(book_b).await, 4);
        assert_eq!(ctx.cart_line_count(customer).await, 0);

        Ok(())
    }

    #[tokio::test]
    async fn place_order_with_short_stock_writes_nothing() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;
        let customer = ctx.create_actor(Role::Customer).await;
        let book_a = ctx.create_book(seller, 1_000, 5).await;
        let book_b = ctx.create_book(seller, 500, 5).await;

        ctx.add_to_cart(customer, book_a, 2).await?;
        ctx.add_to_cart(customer, book_b, 1).await?;
        ctx.set_book_stock(book_a, 1).await;

        let result = ctx.orders.place_order(customer).await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::InsufficientStock { book, available: 1 }) if book == book_a
            ),
            "expected InsufficientStock for book A, got {result:?}"
        );

        assert_eq!(ctx.book_stock(book_a).await, 1);
        assert_eq!(ctx.book_stock(book_b).await, 5);
        assert_eq!(ctx.cart_line_count(customer).await, 2);
        assert_eq!(ctx.order_count().await, 0);

        Ok(())
    }

    #[tokio::test]
    async fn place_order_without_cart_lines_is_empty_cart() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;
        let customer = ctx.create_actor(Role::Customer).await;

        let result = ctx.orders.place_order(customer).await;

        assert!(
            matches!(result, Err(OrdersServiceError::EmptyCart)),
            "expected EmptyCart without a cart, got {result:?}"
        );

        let book = ctx.create_book(seller, 1_000, 5).await;
        let line = ctx.add_to_cart(customer, book, 1).await?;

        ctx.carts.remove_item(customer, line.uuid).await?;

        let result = ctx.orders.place_order(customer).await;

        assert!(
            matches!(result, Err(OrdersServiceError::EmptyCart)),
            "expected EmptyCart with an emptied cart, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_checkouts_never_oversell() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;
        let book = ctx.create_book(seller, 1_000, 3).await;

        let mut customers = Vec::new();

        for _ in 0..4 {
            let customer = ctx.create_actor(Role::Customer).await;

            ctx.add_to_cart(customer, book, 2).await?;
            customers.push(customer);
        }

        let results = checkout_all(&ctx, &customers).await;

        let placed = results.iter().filter(|result| result.is_ok()).count();
        let short = results
            .iter()
            .filter(|result| matches!(result, Err(OrdersServiceError::InsufficientStock { .. })))
            .count();

        assert_eq!(placed, 1, "only one order of two fits into a stock of three");
        assert_eq!(short, 3, "every other checkout must report insufficient stock");
        assert_eq!(ctx.book_stock(book).await, 1);

        Ok(())
    }

    async fn checkout_all(
        ctx: &TestContext,
        customers: &[Actor],
    ) -> Vec<Result<OrderRecord, OrdersServiceError>> {
        let mut handles = Vec::new();

        for &customer in customers {
            let orders = ctx.orders.clone();

            handles.push(tokio::spawn(async move { orders.place_order(customer).await }));
        }

        let mut results = Vec::new();

        for handle in handles {
            results.push(handle.await.expect("checkout task panicked"));
        }

        results
    }

    #[tokio::test]
    async fn list_orders_returns_own_orders_newest_first() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;
        let customer = ctx.create_actor(Role::Customer).await;
        let other = ctx.create_actor(Role::Customer).await;
        let book = ctx.create_book(seller, 1_000, 10).await;

        let first = ctx.checkout(customer, &[(book, 1)]).await?;
        let second = ctx.checkout(customer, &[(book, 2)]).await?;
        ctx.checkout(other, &[(book, 1)]).await?;

        let orders = ctx.orders.list_orders(customer).await?;
        let uuids: Vec<_> = orders.iter().map(|order| order.uuid).collect();

        assert_eq!(uuids, vec![second.uuid, first.uuid]);
        assert_eq!(orders.first().map(|order| order.items.len()), Some(1));
        assert_eq!(
            orders
                .first()
                .and_then(|order| order.items.first())
                .map(|item| item.quantity),
            Some(2)
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_order_is_limited_to_owner_and_staff() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;
        let customer = ctx.create_actor(Role::Customer).await;
        let other = ctx.create_actor(Role::Customer).await;
        let book = ctx.create_book(seller, 1_000, 10).await;

        let order = ctx.checkout(customer, &[(book, 1)]).await?;

        assert_eq!(ctx.orders.get_order(customer, order.uuid).await?.uuid, order.uuid);
        assert_eq!(ctx.orders.get_order(seller, order.uuid).await?.items.len(), 1);
        assert_eq!(ctx.orders.get_order(ctx.admin, order.uuid).await?.total_price, 1_000);

        let result = ctx.orders.get_order(other, order.uuid).await;

        assert!(
            matches!(result, Err(OrdersServiceError::Unauthorized)),
            "expected Unauthorized, got {result:?}"
        );

        let result = ctx.orders.get_order(customer, OrderUuid::new()).await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_status_walks_fulfilment_and_stops_at_terminal() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;
        let customer = ctx.create_actor(Role::Customer).await;
        let book = ctx.create_book(seller, 1_000, 10).await;

        let order = ctx.checkout(customer, &[(book, 1)]).await?;

        for status in [
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            let updated = ctx.orders.update_status(seller, order.uuid, status).await?;

            assert_eq!(updated.order_status, status);
        }

        for actor in [ctx.admin, seller, customer] {
            let result = ctx
                .orders
                .update_status(actor, order.uuid, OrderStatus::Processing)
                .await;

            assert!(
                matches!(
                    result,
                    Err(OrdersServiceError::OrderAlreadyFinal(OrderStatus::Delivered))
                ),
                "expected OrderAlreadyFinal, got {result:?}"
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn update_status_rejects_strangers() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;
        let customer = ctx.create_actor(Role::Customer).await;
        let other = ctx.create_actor(Role::Customer).await;
        let book = ctx.create_book(seller, 1_000, 10).await;

        let order = ctx.checkout(customer, &[(book, 1)]).await?;

        let result = ctx
            .orders
            .update_status(other, order.uuid, OrderStatus::Processing)
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::Unauthorized)),
            "expected Unauthorized, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn strict_policy_rejects_skipping_ahead() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;
        let customer = ctx.create_actor(Role::Customer).await;
        let book = ctx.create_book(seller, 1_000, 10).await;

        let order = ctx.checkout(customer, &[(book, 1)]).await?;

        let result = ctx
            .orders
            .update_status(ctx.admin, order.uuid, OrderStatus::Delivered)
            .await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::InvalidTransition {
                    from: OrderStatus::Pending,
                    to: OrderStatus::Delivered,
                })
            ),
            "expected InvalidTransition, got {result:?}"
        );

        let unchanged = ctx
            .orders
            .update_status(ctx.admin, order.uuid, OrderStatus::Pending)
            .await?;

        assert_eq!(unchanged.order_status, OrderStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn permissive_policy_accepts_skipping_ahead() -> TestResult {
        let ctx = TestContext::with_transition_policy(TransitionPolicy::Permissive).await;
        let seller = ctx.create_actor(Role::Seller).await;
        let customer = ctx.create_actor(Role::Customer).await;
        let book = ctx.create_book(seller, 1_000, 10).await;

        let order = ctx.checkout(customer, &[(book, 1)]).await?;

        let updated = ctx
            .orders
            .update_status(customer, order.uuid, OrderStatus::Delivered)
            .await?;

        assert_eq!(updated.order_status, OrderStatus::Delivered);

        let result = ctx
            .orders
            .update_status(customer, order.uuid, OrderStatus::Pending)
            .await;

        assert!(
            matches!(result, Err(OrdersServiceError::OrderAlreadyFinal(_))),
            "expected OrderAlreadyFinal, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn cancel_order_is_owner_only_and_keeps_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;
        let customer = ctx.create_actor(Role::Customer).await;
        let book = ctx.create_book(seller, 1_000, 5).await;

        let order = ctx.checkout(customer, &[(book, 2)]).await?;

        let result = ctx.orders.cancel_order(ctx.admin, order.uuid).await;

        assert!(
            matches!(result, Err(OrdersServiceError::Unauthorized)),
            "expected Unauthorized for non-owner, got {result:?}"
        );

        let canceled = ctx.orders.cancel_order(customer, order.uuid).await?;

        assert_eq!(canceled.order_status, OrderStatus::Canceled);
        assert_eq!(ctx.book_stock(book).await, 3, "cancellation does not restock");

        let result = ctx.orders.cancel_order(customer, order.uuid).await;

        assert!(
            matches!(
                result,
                Err(OrdersServiceError::OrderAlreadyFinal(OrderStatus::Canceled))
            ),
            "expected OrderAlreadyFinal, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn cancel_order_requires_pending() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;
        let customer = ctx.create_actor(Role::Customer).await;
        let book = ctx.create_book(seller, 1_000, 5).await;

        let order = ctx.checkout(customer, &[(book, 1)]).await?;

        ctx.orders
            .update_status(seller, order.uuid, OrderStatus::Processing)
            .await?;

        let result = ctx.orders.cancel_order(customer, order.uuid).await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotPending)),
            "expected NotPending, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_order_is_admin_only_for_pending_or_canceled() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;
        let customer = ctx.create_actor(Role::Customer).await;
        let book = ctx.create_book(seller, 1_000, 5).await;

        let pending = ctx.checkout(customer, &[(book, 1)]).await?;
        let processing = ctx.checkout(customer, &[(book, 1)]).await?;

        ctx.orders
            .update_status(seller, processing.uuid, OrderStatus::Processing)
            .await?;

        let result = ctx.orders.delete_order(seller, pending.uuid).await;

        assert!(
            matches!(result, Err(OrdersServiceError::Unauthorized)),
            "expected Unauthorized, got {result:?}"
        );

        let result = ctx.orders.delete_order(ctx.admin, processing.uuid).await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotDeletable)),
            "expected NotDeletable, got {result:?}"
        );

        ctx.orders.delete_order(ctx.admin, pending.uuid).await?;

        let result = ctx.orders.get_order(ctx.admin, pending.uuid).await;

        assert!(
            matches!(result, Err(OrdersServiceError::NotFound)),
            "expected NotFound after delete, got {result:?}"
        );

        Ok(())
    }
}
