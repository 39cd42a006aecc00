//! Read-only reporting views

pub mod errors;
pub mod records;
mod repository;
mod sales;
pub mod service;

pub use errors::ReportsServiceError;
pub use service::*;
