// lensflow/src/model/money.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount in the shop currency (VND, which has no minor unit).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub i64);

impl Money {
  pub const ZERO: Money = Money(0);

  pub fn amount(self) -> i64 {
    self.0
  }

  pub fn is_zero(self) -> bool {
    self.0 == 0
  }

  pub fn is_positive(self) -> bool {
    self.0 > 0
  }

  pub fn checked_sub(self, other: Money) -> Option<Money> {
    self.0.checked_sub(other.0).map(Money)
  }
}

impl From<i64> for Money {
  fn from(amount: i64) -> Self {
    Money(amount)
  }
}

impl fmt::Display for Money {
  /// Groups thousands the way receipts print them: `200,000`.
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let digits = self.0.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
      if i > 0 && (digits.len() - i) % 3 == 0 {
        grouped.push(',');
      }
      grouped.push(ch);
    }
    if self.0 < 0 {
      write!(f, "-{}", grouped)
    } else {
      write!(f, "{}", grouped)
    }
  }
}
