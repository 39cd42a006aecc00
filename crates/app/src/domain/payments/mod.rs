//! Payments and seller settlement

pub mod data;
pub mod errors;
pub mod records;
pub(crate) mod repositories;
pub mod service;
mod settlement;
pub mod validation;

pub use errors::PaymentsServiceError;
pub use service::*;
