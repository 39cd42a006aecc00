//! Bookstore Domain Concerns

use thiserror::Error;

pub mod books;
pub mod carts;
pub mod categories;
pub mod orders;
pub mod payments;
pub mod reports;
pub mod users;

/// A string that does not name any member of a closed set of values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
