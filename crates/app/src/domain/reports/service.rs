//! Reports service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::{
        orders::records::OrderUuid,
        reports::{
            errors::ReportsServiceError,
            records::{AdminOrderSummary, SellerSale},
            repository::PgReportsRepository,
            sales::group_sales,
        },
        users::records::Actor,
    },
};

#[derive(Debug, Clone)]
pub struct PgReportsService {
    db: Db,
    repository: PgReportsRepository,
}

impl PgReportsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgReportsRepository::new(),
        }
    }
}

#[async_trait]
impl ReportsService for PgReportsService {
    async fn seller_sales(&self, actor: Actor) -> Result<Vec<SellerSale>, ReportsServiceError> {
        if !actor.is_staff() {
            return Err(ReportsServiceError::Unauthorized);
        }

        let mut tx = self.db.begin().await?;

        let lines = self.repository.list_seller_lines(&mut tx, actor.user).await?;

        let mut orders: Vec<OrderUuid> = lines.iter().map(|line| line.order_uuid).collect();
        orders.dedup();

        let payments = self.repository.list_order_payments(&mut tx, &orders).await?;

        tx.commit().await?;

        group_sales(lines, payments).ok_or(ReportsServiceError::InvalidData)
    }

    async fn admin_orders(
        &self,
        actor: Actor,
    ) -> Result<Vec<AdminOrderSummary>, ReportsServiceError> {
        if !actor.is_admin() {
            return Err(ReportsServiceError::Unauthorized);
        }

        let mut tx = self.db.begin().await?;

        let orders = self.repository.list_admin_orders(&mut tx).await?;

        tx.commit().await?;

        Ok(orders)
    }
}

#[automock]
#[async_trait]
pub trait ReportsService: Send + Sync {
    /// The caller's sold lines grouped per order, newest first.
    async fn seller_sales(&self, actor: Actor) -> Result<Vec<SellerSale>, ReportsServiceError>;

    /// Every order with its buyer and item count, newest first. Admin only.
    async fn admin_orders(&self, actor: Actor)
    -> Result<Vec<AdminOrderSummary>, ReportsServiceError>;
}
