//! Carts service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        books::{records::BookRecord, repository::PgBooksRepository},
        carts::{
            data::{CartItemUpdate, NewCartItem},
            errors::CartsServiceError,
            records::{CartItemRecord, CartItemUuid, CartRecord},
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        users::records::Actor,
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    books_repository: PgBooksRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            books_repository: PgBooksRepository::new(),
        }
    }
}

fn book_lookup_error(error: sqlx::Error) -> CartsServiceError {
    if matches!(error, sqlx::Error::RowNotFound) {
        return CartsServiceError::BookNotFound;
    }

    error.into()
}

fn ensure_in_stock(book: &BookRecord, quantity: u64) -> Result<(), CartsServiceError> {
    if quantity > book.stock {
        return Err(CartsServiceError::InsufficientStock {
            book: book.uuid,
            available: book.stock,
        });
    }

    Ok(())
}

/// Sum of line totals, or `None` on overflow.
fn cart_subtotal(items: &[CartItemRecord]) -> Option<u64> {
    items
        .iter()
        .try_fold(0_u64, |sum, item| sum.checked_add(item.line_total()?))
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, actor: Actor) -> Result<CartRecord, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut cart = self
            .carts_repository
            .get_cart(&mut tx, actor.user)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        let items = self
            .items_repository
            .get_cart_items(&mut tx, cart.uuid)
            .await?;

        tx.commit().await?;

        if items.is_empty() {
            return Err(CartsServiceError::NotFound);
        }

        cart.subtotal = cart_subtotal(&items).ok_or(CartsServiceError::InvalidData)?;
        cart.total = cart.subtotal;
        cart.items.extend(items);

        Ok(cart)
    }

    async fn add_item(
        &self,
        actor: Actor,
        item: NewCartItem,
    ) -> Result<CartItemRecord, CartsServiceError> {
        if item.quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin().await?;

        let cart = self
            .carts_repository
            .upsert_cart(&mut tx, actor.user)
            .await?;

        let book = self
            .books_repository
            .lock_book(&mut tx, item.book)
            .await
            .map_err(book_lookup_error)?;

        if !book.is_for_sale() {
            return Err(CartsServiceError::BookUnavailable);
        }

        let existing = self
            .items_repository
            .find_item_by_book(&mut tx, cart.uuid, book.uuid)
            .await?
            .map_or(0, |line| line.quantity);

        let quantity = existing
            .checked_add(item.quantity)
            .ok_or(CartsServiceError::InvalidQuantity)?;

        ensure_in_stock(&book, quantity)?;

        let saved = self
            .items_repository
            .upsert_item(&mut tx, cart.uuid, book.uuid, quantity, book.price)
            .await?;

        tx.commit().await?;

        Ok(saved)
    }

    async fn update_item(
        &self,
        actor: Actor,
        item: CartItemUuid,
        update: CartItemUpdate,
    ) -> Result<CartItemRecord, CartsServiceError> {
        if update.quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin().await?;

        let cart = self
            .carts_repository
            .lock_cart(&mut tx, actor.user)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        let line = self
            .items_repository
            .lock_item(&mut tx, cart.uuid, item)
            .await?;

        let book = self
            .books_repository
            .lock_book(&mut tx, line.book_uuid)
            .await
            .map_err(book_lookup_error)?;

        ensure_in_stock(&book, update.quantity)?;

        let saved = self
            .items_repository
            .update_item(&mut tx, line.uuid, update.quantity, book.price)
            .await?;

        tx.commit().await?;

        Ok(saved)
    }

    async fn remove_item(&self, actor: Actor, item: CartItemUuid) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self
            .carts_repository
            .lock_cart(&mut tx, actor.user)
            .await?
            .ok_or(CartsServiceError::NotFound)?;

        let rows_affected = self
            .items_repository
            .delete_item(&mut tx, cart.uuid, item)
            .await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the caller's cart with computed totals. Missing and empty carts are `NotFound`.
    async fn get_cart(&self, actor: Actor) -> Result<CartRecord, CartsServiceError>;

    /// Add a book to the caller's cart, merging with an existing line for the same book.
    async fn add_item(
        &self,
        actor: Actor,
        item: NewCartItem,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// Set the quantity of a line in the caller's cart.
    async fn update_item(
        &self,
        actor: Actor,
        item: CartItemUuid,
        update: CartItemUpdate,
    ) -> Result<CartItemRecord, CartsServiceError>;

    /// Remove a line from the caller's cart.
    async fn remove_item(&self, actor: Actor, item: CartItemUuid) -> Result<(), CartsServiceError>;
}
