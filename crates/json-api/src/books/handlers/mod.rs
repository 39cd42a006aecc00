//! Book Handlers

pub(crate) mod create;
pub(crate) mod delete;
pub(crate) mod get;
pub(crate) mod index;
pub(crate) mod mine;
pub(crate) mod moderate;
pub(crate) mod requested;
pub(crate) mod update;

#[cfg(test)]
mod tests {
    use bookstore_app::domain::{
        books::records::{BookRecord, BookStatus, BookUuid},
        categories::records::CategoryUuid,
        users::records::UserUuid,
    };
    use jiff::Timestamp;

    pub(super) fn make_book(uuid: BookUuid, seller: UserUuid, status: BookStatus) -> BookRecord {
        BookRecord {
            uuid,
            seller_uuid: seller,
            category_uuid: CategoryUuid::new(),
            name: "Kindred".to_string(),
            author: "Octavia E. Butler".to_string(),
            description: String::new(),
            price: 1_450,
            stock: 3,
            status,
            reject_note: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }
}
