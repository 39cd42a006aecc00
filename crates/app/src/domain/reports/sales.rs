//! Grouping a seller's order lines into per-order sales.

use std::collections::HashMap;

use jiff::Timestamp;

use crate::domain::{
    books::records::BookUuid,
    orders::records::{OrderStatus, OrderUuid, PaymentStatus},
    reports::records::{Buyer, SalePayment, SellerSale, SoldBook},
};

/// One of the seller's order lines joined with its order and buyer.
#[derive(Debug, Clone)]
pub(super) struct SaleLine {
    pub(super) order_uuid: OrderUuid,
    pub(super) order_status: OrderStatus,
    pub(super) payment_status: PaymentStatus,
    pub(super) ordered_at: Timestamp,
    pub(super) buyer: Option<Buyer>,
    pub(super) book_uuid: BookUuid,
    pub(super) book_name: String,
    pub(super) quantity: u64,
    pub(super) price: u64,
}

#[derive(Debug, Clone)]
pub(super) struct OrderPayment {
    pub(super) order_uuid: OrderUuid,
    pub(super) payment: SalePayment,
}

/// Blank notes and the literal string "null" carry no information.
pub(super) fn normalise_notes(notes: Option<String>) -> Option<String> {
    notes.filter(|notes| {
        let trimmed = notes.trim();

        !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case("null")
    })
}

/// Group lines by order, keeping the order the lines arrive in. `None` on overflow.
pub(super) fn group_sales(
    lines: Vec<SaleLine>,
    payments: Vec<OrderPayment>,
) -> Option<Vec<SellerSale>> {
    let mut sales: Vec<SellerSale> = Vec::new();
    let mut positions: HashMap<OrderUuid, usize> = HashMap::new();

    for line in lines {
        let line_total = line.quantity.checked_mul(line.price)?;

        let position = *positions.entry(line.order_uuid).or_insert_with(|| {
            sales.push(SellerSale {
                order_uuid: line.order_uuid,
                buyer: line.buyer.clone(),
                order_status: line.order_status,
                payment_status: line.payment_status,
                ordered_at: line.ordered_at,
                total_earned: 0,
                books: Vec::new(),
                payments: Vec::new(),
            });

            sales.len() - 1
        });

        let sale = sales.get_mut(position)?;

        sale.total_earned = sale.total_earned.checked_add(line_total)?;
        sale.books.push(SoldBook {
            book_uuid: line.book_uuid,
            name: line.book_name,
            quantity: line.quantity,
            price: line.price,
            line_total,
        });
    }

    for OrderPayment {
        order_uuid,
        mut payment,
    } in payments
    {
        if let Some(sale) = positions
            .get(&order_uuid)
            .and_then(|&position| sales.get_mut(position))
        {
            payment.order_notes = normalise_notes(payment.order_notes);
            sale.payments.push(payment);
        }
    }

    Some(sales)
}
