//! Admin Orders Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bookstore_app::domain::reports::records::AdminOrderSummary;

use crate::{
    extensions::*,
    reports::{errors::into_status_error, handlers::seller_sales::BuyerResponse},
    state::State,
};

/// Admin Order Summary Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AdminOrderSummaryResponse {
    pub order_uuid: Uuid,
    pub user_uuid: Option<Uuid>,
    pub buyer: Option<BuyerResponse>,
    /// Number of line items
    pub item_count: u64,
    pub total_price: u64,
    pub order_status: String,
    pub payment_status: String,
    pub created_at: String,
}

impl From<AdminOrderSummary> for AdminOrderSummaryResponse {
    fn from(summary: AdminOrderSummary) -> Self {
        Self {
            order_uuid: summary.order_uuid.into_uuid(),
            user_uuid: summary.user_uuid.map(Into::into),
            buyer: summary.buyer.map(Into::into),
            item_count: summary.item_count,
            total_price: summary.total_price,
            order_status: summary.order_status.to_string(),
            payment_status: summary.payment_status.to_string(),
            created_at: summary.created_at.to_string(),
        }
    }
}

/// Admin Orders Handler
#[endpoint(
    tags("reports"),
    summary = "Admin Order Overview",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Every order, newest first"),
        (status_code = StatusCode::FORBIDDEN, description = "Caller is not an admin"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(name = "reports.admin_orders", skip(depot), err)]
pub(crate) async fn handler(
    depot: &mut Depot,
) -> Result<Json<Vec<AdminOrderSummaryResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let actor = depot.actor_or_401()?;

    let orders = state
        .app
        .reports
        .admin_orders(actor)
        .await
        .map_err(into_status_error)?;

    Ok(Json(orders.into_iter().map(Into::into).collect()))
}
