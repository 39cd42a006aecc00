//! Books service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        books::{
            data::{BookUpdate, NewBook},
            errors::BooksServiceError,
            records::{BookRecord, BookStatus, BookUuid},
            repository::PgBooksRepository,
        },
        users::records::Actor,
    },
};

#[derive(Debug, Clone)]
pub struct PgBooksService {
    db: Db,
    repository: PgBooksRepository,
}

impl PgBooksService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgBooksRepository::new(),
        }
    }

    async fn moderate(
        &self,
        actor: Actor,
        book: BookUuid,
        status: BookStatus,
        reject_note: Option<&str>,
    ) -> Result<BookRecord, BooksServiceError> {
        if !actor.is_admin() {
            return Err(BooksServiceError::Unauthorized);
        }

        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .set_status(&mut tx, book, status, reject_note)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }
}

fn can_manage(actor: Actor, book: &BookRecord) -> bool {
    actor.is_admin() || book.seller_uuid == actor.user
}

#[async_trait]
impl BooksService for PgBooksService {
    async fn list_books(&self) -> Result<Vec<BookRecord>, BooksServiceError> {
        let mut tx = self.db.begin().await?;

        let books = self.repository.list_books(&mut tx).await?;

        tx.commit().await?;

        Ok(books)
    }

    async fn list_all_books(&self, actor: Actor) -> Result<Vec<BookRecord>, BooksServiceError> {
        if !actor.is_admin() {
            return Err(BooksServiceError::Unauthorized);
        }

        let mut tx = self.db.begin().await?;

        let books = self.repository.list_all_books(&mut tx).await?;

        tx.commit().await?;

        Ok(books)
    }

    async fn list_seller_books(
        &self,
        actor: Actor,
    ) -> Result<Vec<BookRecord>, BooksServiceError> {
        if !actor.is_staff() {
            return Err(BooksServiceError::Unauthorized);
        }

        let mut tx = self.db.begin().await?;

        let books = self.repository.list_seller_books(&mut tx, actor.user).await?;

        tx.commit().await?;

        Ok(books)
    }

    async fn get_book(&self, book: BookUuid) -> Result<BookRecord, BooksServiceError> {
        let mut tx = self.db.begin().await?;

        let book = self.repository.get_book(&mut tx, book).await?;

        tx.commit().await?;

        Ok(book)
    }

    async fn create_book(
        &self,
        actor: Actor,
        book: NewBook,
    ) -> Result<BookRecord, BooksServiceError> {
        if !actor.is_staff() {
            return Err(BooksServiceError::Unauthorized);
        }

        let mut tx = self.db.begin().await?;

        let created = self.repository.create_book(&mut tx, actor.user, &book).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_book(
        &self,
        actor: Actor,
        book: BookUuid,
        update: BookUpdate,
    ) -> Result<BookRecord, BooksServiceError> {
        let mut tx = self.db.begin().await?;

        let existing = self.repository.lock_book(&mut tx, book).await?;

        if !can_manage(actor, &existing) {
            return Err(BooksServiceError::Unauthorized);
        }

        let updated = self.repository.update_book(&mut tx, book, &update).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_book(&self, actor: Actor, book: BookUuid) -> Result<(), BooksServiceError> {
        let mut tx = self.db.begin().await?;

        let existing = self.repository.lock_book(&mut tx, book).await?;

        if !can_manage(actor, &existing) {
            return Err(BooksServiceError::Unauthorized);
        }

        let rows_affected = self.repository.delete_book(&mut tx, book).await?;

        if rows_affected == 0 {
            return Err(BooksServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn approve_book(
        &self,
        actor: Actor,
        book: BookUuid,
    ) -> Result<BookRecord, BooksServiceError> {
        self.moderate(actor, book, BookStatus::Approved, None).await
    }

    async fn reject_book(
        &self,
        actor: Actor,
        book: BookUuid,
        note: String,
    ) -> Result<BookRecord, BooksServiceError> {
        self.moderate(actor, book, BookStatus::Disapproved, Some(note.as_str()))
            .await
    }
}

#[automock]
#[async_trait]
pub trait BooksService: Send + Sync {
    /// Retrieves every book that is approved for sale.
    async fn list_books(&self) -> Result<Vec<BookRecord>, BooksServiceError>;

    /// Every book in any moderation state, newest first. Admin only.
    async fn list_all_books(&self, actor: Actor) -> Result<Vec<BookRecord>, BooksServiceError>;

    /// The calling seller's own listings in any moderation state.
    async fn list_seller_books(&self, actor: Actor)
    -> Result<Vec<BookRecord>, BooksServiceError>;

    /// Retrieve a single book regardless of moderation state.
    async fn get_book(&self, book: BookUuid) -> Result<BookRecord, BooksServiceError>;

    /// List a new book for the calling seller. New listings await approval.
    async fn create_book(&self, actor: Actor, book: NewBook)
    -> Result<BookRecord, BooksServiceError>;

    /// Replace a listing's details. Sends the listing back for approval.
    async fn update_book(
        &self,
        actor: Actor,
        book: BookUuid,
        update: BookUpdate,
    ) -> Result<BookRecord, BooksServiceError>;

    /// Remove a listing that no order references.
    async fn delete_book(&self, actor: Actor, book: BookUuid) -> Result<(), BooksServiceError>;

    /// Approve a listing for sale. Admin only.
    async fn approve_book(&self, actor: Actor, book: BookUuid)
    -> Result<BookRecord, BooksServiceError>;

    /// Reject a listing with a note for the seller. Admin only.
    async fn reject_book(
        &self,
        actor: Actor,
        book: BookUuid,
        note: String,
    ) -> Result<BookRecord, BooksServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{categories::records::CategoryUuid, users::records::Role},
        test::TestContext,
    };

    use super::*;

    fn new_book(category: CategoryUuid, price: u64, stock: u64) -> NewBook {
        NewBook {
            uuid: BookUuid::new(),
            category,
            name: "The Dispossessed".to_string(),
            author: "Ursula K. Le Guin".to_string(),
            description: String::new(),
            price,
            stock,
        }
    }

    #[tokio::test]
    async fn seller_creates_pending_book() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;
        let category = ctx.create_category("Fiction").await;

        let book = ctx
            .books
            .create_book(seller, new_book(category, 1_299, 4))
            .await?;

        assert_eq!(book.status, BookStatus::Pending);
        assert_eq!(book.seller_uuid, seller.user);
        assert_eq!(book.price, 1_299);
        assert_eq!(book.stock, 4);

        let listed = ctx.books.list_books().await?;

        assert!(
            !listed.iter().any(|b| b.uuid == book.uuid),
            "pending books must not be listed for sale"
        );

        Ok(())
    }

    #[tokio::test]
    async fn customer_cannot_create_book() {
        let ctx = TestContext::new().await;
        let customer = ctx.create_actor(Role::Customer).await;
        let category = ctx.create_category("Fiction").await;

        let result = ctx
            .books
            .create_book(customer, new_book(category, 100, 1))
            .await;

        assert!(
            matches!(result, Err(BooksServiceError::Unauthorized)),
            "expected Unauthorized, got {result:?}"
        );
    }

    #[tokio::test]
    async fn create_book_with_unknown_category_returns_invalid_reference() {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;

        let result = ctx
            .books
            .create_book(seller, new_book(CategoryUuid::new(), 100, 1))
            .await;

        assert!(
            matches!(result, Err(BooksServiceError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );
    }

    #[tokio::test]
    async fn approved_book_is_listed_and_update_resets_approval() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;
        let category = ctx.create_category("Fiction").await;

        let book = ctx
            .books
            .create_book(seller, new_book(category, 500, 2))
            .await?;

        ctx.books.approve_book(ctx.admin, book.uuid).await?;

        assert!(ctx.books.list_books().await?.iter().any(|b| b.uuid == book.uuid));

        let updated = ctx
            .books
            .update_book(
                seller,
                book.uuid,
                BookUpdate {
                    category,
                    name: book.name.clone(),
                    author: book.author.clone(),
                    description: "Second edition".to_string(),
                    price: 650,
                    stock: 9,
                },
            )
            .await?;

        assert_eq!(updated.status, BookStatus::Pending);
        assert_eq!(updated.price, 650);
        assert_eq!(updated.stock, 9);

        Ok(())
    }

    #[tokio::test]
    async fn other_seller_cannot_update_or_delete() -> TestResult {
        let ctx = TestContext::new().await;
        let owner = ctx.create_actor(Role::Seller).await;
        let intruder = ctx.create_actor(Role::Seller).await;
        let book = ctx.create_book(owner, 100, 1).await;

        let result = ctx.books.delete_book(intruder, book).await;

        assert!(
            matches!(result, Err(BooksServiceError::Unauthorized)),
            "expected Unauthorized, got {result:?}"
        );

        ctx.books.delete_book(owner, book).await?;

        let result = ctx.books.get_book(book).await;

        assert!(
            matches!(result, Err(BooksServiceError::NotFound)),
            "expected NotFound after delete, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn only_admin_moderates() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;
        let category = ctx.create_category("Fiction").await;

        let book = ctx
            .books
            .create_book(seller, new_book(category, 100, 1))
            .await?;

        let result = ctx.books.approve_book(seller, book.uuid).await;

        assert!(
            matches!(result, Err(BooksServiceError::Unauthorized)),
            "expected Unauthorized, got {result:?}"
        );

        let rejected = ctx
            .books
            .reject_book(ctx.admin, book.uuid, "Blurry cover".to_string())
            .await?;

        assert_eq!(rejected.status, BookStatus::Disapproved);
        assert_eq!(rejected.reject_note.as_deref(), Some("Blurry cover"));

        Ok(())
    }

    #[tokio::test]
    async fn admin_sees_pending_books_and_sellers_see_their_own() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;
        let other = ctx.create_actor(Role::Seller).await;
        let category = ctx.create_category("Fiction").await;

        let pending = ctx
            .books
            .create_book(seller, new_book(category, 700, 1))
            .await?;
        let approved = ctx.create_book(other, 900, 1).await;

        let all: Vec<_> = ctx
            .books
            .list_all_books(ctx.admin)
            .await?
            .into_iter()
            .map(|book| (book.uuid, book.status))
            .collect();

        assert!(all.contains(&(pending.uuid, BookStatus::Pending)));
        assert!(all.contains(&(approved, BookStatus::Approved)));

        let own: Vec<_> = ctx
            .books
            .list_seller_books(seller)
            .await?
            .into_iter()
            .map(|book| book.uuid)
            .collect();

        assert_eq!(own, vec![pending.uuid]);

        let result = ctx.books.list_all_books(seller).await;

        assert!(
            matches!(result, Err(BooksServiceError::Unauthorized)),
            "expected Unauthorized, got {result:?}"
        );

        let customer = ctx.create_actor(Role::Customer).await;
        let result = ctx.books.list_seller_books(customer).await;

        assert!(
            matches!(result, Err(BooksServiceError::Unauthorized)),
            "expected Unauthorized, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn ordered_book_cannot_be_deleted() -> TestResult {
        let ctx = TestContext::new().await;
        let seller = ctx.create_actor(Role::Seller).await;
        let customer = ctx.create_actor(Role::Customer).await;
        let book = ctx.create_book(seller, 1_000, 3).await;

        ctx.checkout(customer, &[(book, 1)]).await?;

        let result = ctx.books.delete_book(seller, book).await;

        assert!(
            matches!(result, Err(BooksServiceError::InvalidReference)),
            "expected InvalidReference, got {result:?}"
        );

        assert_eq!(ctx.book_stock(book).await, 2);

        Ok(())
    }
}
