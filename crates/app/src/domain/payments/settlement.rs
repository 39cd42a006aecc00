//! Splitting an order's value between its sellers.

use smallvec::SmallVec;

use crate::domain::users::records::UserUuid;

/// One order line with the seller of its book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SettlementLine {
    pub(crate) seller: UserUuid,
    pub(crate) quantity: u64,
    pub(crate) price: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SellerShare {
    pub(crate) seller: UserUuid,
    pub(crate) amount: u64,
}

/// Most orders involve a handful of sellers.
pub(crate) type SellerShares = SmallVec<[SellerShare; 4]>;

/// Σ(price × quantity) per seller, ordered by seller uuid. `None` on overflow.
pub(crate) fn split_by_seller(lines: &[SettlementLine]) -> Option<SellerShares> {
    let mut shares = SellerShares::new();

    for line in lines {
        let amount = line.price.checked_mul(line.quantity)?;

        match shares.binary_search_by_key(&line.seller, |share| share.seller) {
            Ok(position) => {
                let share = shares.get_mut(position)?;

                share.amount = share.amount.checked_add(amount)?;
            }
            Err(position) => shares.insert(
                position,
                SellerShare {
                    seller: line.seller,
                    amount,
                },
            ),
        }
    }

    Some(shares)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_sellers_split_sixty_forty() {
        let first = UserUuid::new();
        let second = UserUuid::new();

        let lines = [
            SettlementLine {
                seller: first,
                quantity: 2,
                price: 3_000,
            },
            SettlementLine {
                seller: second,
                quantity: 1,
                price: 4_000,
            },
        ];

        let shares = split_by_seller(&lines);

        assert_eq!(
            shares.map(|shares| shares.into_vec()),
            Some(vec![
                SellerShare {
                    seller: first,
                    amount: 6_000,
                },
                SellerShare {
                    seller: second,
                    amount: 4_000,
                },
            ])
        );
    }

    #[test]
    fn lines_from_one_seller_are_merged() {
        let seller = UserUuid::new();

        let lines = [
            SettlementLine {
                seller,
                quantity: 1,
                price: 1_000,
            },
            SettlementLine {
                seller,
                quantity: 3,
                price: 250,
            },
        ];

        let shares = split_by_seller(&lines).unwrap_or_default();

        assert_eq!(shares.len(), 1);
        assert_eq!(shares.first().map(|share| share.amount), Some(1_750));
    }

    #[test]
    fn shares_sum_to_the_order_total() {
        let sellers = [UserUuid::new(), UserUuid::new(), UserUuid::new()];

        let lines: Vec<_> = (0..9_u64)
            .zip(sellers.iter().cycle())
            .map(|(n, &seller)| SettlementLine {
                seller,
                quantity: n + 1,
                price: 199 * (n + 1),
            })
            .collect();

        let total: u64 = lines.iter().map(|line| line.quantity * line.price).sum();
        let shares = split_by_seller(&lines).unwrap_or_default();

        assert_eq!(shares.len(), 3);
        assert_eq!(shares.iter().map(|share| share.amount).sum::<u64>(), total);
    }

    #[test]
    fn overflow_is_reported() {
        let seller = UserUuid::new();

        let lines = [SettlementLine {
            seller,
            quantity: 2,
            price: u64::MAX,
        }];

        assert_eq!(split_by_seller(&lines), None);
    }
}
