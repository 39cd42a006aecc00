//! Report Handlers

pub(crate) mod admin_orders;
pub(crate) mod seller_sales;
