// lensflow/src/model/status.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fulfillment stage of an order.
///
/// The discriminants are the backend's integer codes and the derived ordering
/// follows them: `Pending < Processing < Shipping < Delivered < Completed`.
/// Reachability checks compare statuses with `<` / `>`, so the order of the
/// variants must not change. `Cancelled` sorts last but is only ever entered
/// from `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum OrderStatus {
  Pending = 0,
  Processing = 1,
  Shipping = 2,
  Delivered = 3,
  Completed = 4,
  Cancelled = 5,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 6] = [
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::Shipping,
    OrderStatus::Delivered,
    OrderStatus::Completed,
    OrderStatus::Cancelled,
  ];

  pub fn code(self) -> i32 {
    self as i32
  }

  /// The status one step further along the fulfillment path. `None` from
  /// `Completed` and `Cancelled`.
  pub fn next(self) -> Option<OrderStatus> {
    match self {
      OrderStatus::Pending => Some(OrderStatus::Processing),
      OrderStatus::Processing => Some(OrderStatus::Shipping),
      OrderStatus::Shipping => Some(OrderStatus::Delivered),
      OrderStatus::Delivered => Some(OrderStatus::Completed),
      OrderStatus::Completed | OrderStatus::Cancelled => None,
    }
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Processing => "processing",
      OrderStatus::Shipping => "shipping",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Completed => "completed",
      OrderStatus::Cancelled => "cancelled",
    }
  }
}

impl TryFrom<i32> for OrderStatus {
  type Error = String;

  fn try_from(code: i32) -> Result<Self, Self::Error> {
    OrderStatus::ALL
      .into_iter()
      .find(|s| s.code() == code)
      .ok_or_else(|| format!("unknown order status code {}", code))
  }
}

impl From<OrderStatus> for i32 {
  fn from(status: OrderStatus) -> i32 {
    status.code()
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}({})", self.as_str(), self.code())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ordering_follows_codes() {
    assert!(OrderStatus::Pending < OrderStatus::Processing);
    assert!(OrderStatus::Shipping < OrderStatus::Completed);
    for pair in OrderStatus::ALL.windows(2) {
      assert_eq!(pair[0].code() + 1, pair[1].code());
      assert!(pair[0] < pair[1]);
    }
  }

  #[test]
  fn next_advances_by_one_and_stops_at_terminals() {
    for status in OrderStatus::ALL {
      match status.next() {
        Some(next) => assert_eq!(next.code(), status.code() + 1),
        None => assert!(status.is_terminal()),
      }
    }
  }

  #[test]
  fn rejects_unknown_codes() {
    assert_eq!(OrderStatus::try_from(2), Ok(OrderStatus::Shipping));
    assert!(OrderStatus::try_from(6).is_err());
    assert!(OrderStatus::try_from(-1).is_err());
  }
}
