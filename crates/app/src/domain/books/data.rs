//! Book Data

use crate::domain::{books::records::BookUuid, categories::records::CategoryUuid};

/// New Book Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub uuid: BookUuid,
    pub category: CategoryUuid,
    pub name: String,
    pub author: String,
    pub description: String,
    pub price: u64,
    pub stock: u64,
}

/// Book Update Data
#[derive(Debug, Clone, PartialEq)]
pub struct BookUpdate {
    pub category: CategoryUuid,
    pub name: String,
    pub author: String,
    pub description: String,
    pub price: u64,
    pub stock: u64,
}
