//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, PgAuthService},
    database::{self, DEFAULT_MAX_CONNECTIONS, Db},
    domain::{
        books::{BooksService, PgBooksService},
        carts::{CartsService, PgCartsService},
        categories::{CategoriesService, PgCategoriesService},
        orders::{OrdersService, PgOrdersService, TransitionPolicy},
        payments::{PaymentsService, PgPaymentsService},
        reports::{PgReportsService, ReportsService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// Settings that shape the services built by [`AppContext::from_database_url`].
#[derive(Debug, Clone, Copy)]
pub struct AppOptions {
    pub max_connections: u32,
    pub transition_policy: TransitionPolicy,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            transition_policy: TransitionPolicy::default(),
        }
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub auth: Arc<dyn AuthService>,
    pub categories: Arc<dyn CategoriesService>,
    pub books: Arc<dyn BooksService>,
    pub carts: Arc<dyn CartsService>,
    pub orders: Arc<dyn OrdersService>,
    pub payments: Arc<dyn PaymentsService>,
    pub reports: Arc<dyn ReportsService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(url: &str, options: AppOptions) -> Result<Self, AppInitError> {
        let pool = database::connect(url, options.max_connections)
            .await
            .map_err(AppInitError::Database)?;

        let db = Db::new(pool.clone());

        Ok(Self {
            auth: Arc::new(PgAuthService::new(pool)),
            categories: Arc::new(PgCategoriesService::new(db.clone())),
            books: Arc::new(PgBooksService::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone())),
            orders: Arc::new(PgOrdersService::new(
                db.clone(),
                options.transition_policy,
            )),
            payments: Arc::new(PgPaymentsService::new(db.clone())),
            reports: Arc::new(PgReportsService::new(db)),
        })
    }
}
