//! Categories service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        categories::{
            data::NewCategory, errors::CategoriesServiceError, records::CategoryRecord,
            repository::PgCategoriesRepository,
        },
        users::records::Actor,
    },
};

#[derive(Debug, Clone)]
pub struct PgCategoriesService {
    db: Db,
    repository: PgCategoriesRepository,
}

impl PgCategoriesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCategoriesRepository::new(),
        }
    }
}

#[async_trait]
impl CategoriesService for PgCategoriesService {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, CategoriesServiceError> {
        let mut tx = self.db.begin().await?;

        let categories = self.repository.list_categories(&mut tx).await?;

        tx.commit().await?;

        Ok(categories)
    }

    async fn create_category(
        &self,
        actor: Actor,
        category: NewCategory,
    ) -> Result<CategoryRecord, CategoriesServiceError> {
        if !actor.is_admin() {
            return Err(CategoriesServiceError::Unauthorized);
        }

        let mut tx = self.db.begin().await?;

        let created = self.repository.create_category(&mut tx, &category).await?;

        tx.commit().await?;

        Ok(created)
    }
}

#[automock]
#[async_trait]
pub trait CategoriesService: Send + Sync {
    /// Retrieves all categories ordered by name.
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, CategoriesServiceError>;

    /// Creates a category. Admin only.
    async fn create_category(
        &self,
        actor: Actor,
        category: NewCategory,
    ) -> Result<CategoryRecord, CategoriesServiceError>;
}
