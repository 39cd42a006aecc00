//! Checkout checks that run before anything is written.

use crate::domain::{
    books::records::{BookRecord, BookUuid},
    carts::records::CartItemRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct StockShortfall {
    pub(super) book: BookUuid,
    pub(super) available: u64,
}

/// First cart line asking for more than its book's live stock.
///
/// `books` holds the freshly locked book for each entry in `lines`, in the same order.
pub(super) fn find_shortfall(
    lines: &[CartItemRecord],
    books: &[BookRecord],
) -> Option<StockShortfall> {
    lines
        .iter()
        .zip(books)
        .find(|(line, book)| line.quantity > book.stock)
        .map(|(_, book)| StockShortfall {
            book: book.uuid,
            available: book.stock,
        })
}

/// Σ(quantity × cart price), or `None` on overflow.
pub(super) fn order_total(lines: &[CartItemRecord]) -> Option<u64> {
    lines
        .iter()
        .try_fold(0_u64, |total, line| total.checked_add(line.line_total()?))
}
