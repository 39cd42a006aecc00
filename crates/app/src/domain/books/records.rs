//! Book Records

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;

use crate::{
    domain::{UnknownVariant, categories::records::CategoryUuid, users::records::UserUuid},
    uuids::TypedUuid,
};

/// Book UUID
pub type BookUuid = TypedUuid<BookRecord>;

/// Moderation state of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookStatus {
    Pending,
    Approved,
    Disapproved,
}

impl BookStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Disapproved => "disapproved",
        }
    }
}

impl Display for BookStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "disapproved" => Ok(Self::Disapproved),
            _ => Err(UnknownVariant::new("book status", value)),
        }
    }
}

/// Book Record
///
/// `price` is in cents.
#[derive(Debug, Clone)]
pub struct BookRecord {
    pub uuid: BookUuid,
    pub seller_uuid: UserUuid,
    pub category_uuid: CategoryUuid,
    pub name: String,
    pub author: String,
    pub description: String,
    pub price: u64,
    pub stock: u64,
    pub status: BookStatus,
    pub reject_note: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BookRecord {
    #[must_use]
    pub fn is_for_sale(&self) -> bool {
        self.status == BookStatus::Approved
    }
}
