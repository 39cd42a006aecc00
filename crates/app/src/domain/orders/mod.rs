//! Orders

mod checkout;
pub mod errors;
pub mod lifecycle;
pub mod records;
pub(crate) mod repositories;
pub mod service;

pub use errors::OrdersServiceError;
pub use lifecycle::TransitionPolicy;
pub use service::*;
