//! Order status transitions.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use crate::domain::{UnknownVariant, orders::records::OrderStatus};

/// How strictly requested status changes are checked against the current status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Only the successors in the fulfilment graph are reachable.
    #[default]
    Strict,

    /// Any non-terminal status may move to any status.
    Permissive,
}

/// Why a status change was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRejection {
    AlreadyFinal,
    NotASuccessor,
}

impl TransitionPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Permissive => "permissive",
        }
    }

    /// Check a move from `from` to `to`. Requesting the current status of a
    /// non-terminal order is allowed and changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionRejection::AlreadyFinal`] for terminal orders under
    /// either policy, and [`TransitionRejection::NotASuccessor`] when a strict
    /// policy does not allow the move.
    pub fn check(self, from: OrderStatus, to: OrderStatus) -> Result<(), TransitionRejection> {
        if from.is_terminal() {
            return Err(TransitionRejection::AlreadyFinal);
        }

        if matches!(self, Self::Permissive) || from == to || is_successor(from, to) {
            return Ok(());
        }

        Err(TransitionRejection::NotASuccessor)
    }
}

const fn is_successor(from: OrderStatus, to: OrderStatus) -> bool {
    matches!(
        (from, to),
        (
            OrderStatus::Pending,
            OrderStatus::Processing | OrderStatus::Canceled
        ) | (
            OrderStatus::Processing,
            OrderStatus::Shipped | OrderStatus::Canceled
        ) | (OrderStatus::Shipped, OrderStatus::Delivered)
    )
}

impl Display for TransitionPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitionPolicy {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "strict" => Ok(Self::Strict),
            "permissive" => Ok(Self::Permissive),
            _ => Err(UnknownVariant::new("transition policy", value)),
        }
    }
}
