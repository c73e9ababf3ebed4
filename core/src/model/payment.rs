// lensflow/src/model/payment.rs

use super::{Money, Order, OrderId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a payment-gated action needs, derived from the current order snapshot.
///
/// Built fresh before every payment action and never cached: paying the first
/// instalment of a deposit order changes the amount due for the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentContext {
  pub order_id: OrderId,
  pub amount: Money,
  pub is_deposit: bool,
  pub has_pending_payment: bool,
}

impl PaymentContext {
  pub fn for_order(order: &Order) -> Self {
    Self {
      order_id: order.id,
      amount: order.remaining_amount,
      is_deposit: order.is_deposit,
      has_pending_payment: order.remaining_amount.is_positive(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
  pub id: i64,
  pub amount: Money,
  #[serde(default)]
  pub method: String,
  #[serde(default)]
  pub status: String,
  pub paid_at: DateTime<Utc>,
}

/// Authoritative payment state of an order as reported by the payment service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
  pub order_id: OrderId,
  pub total_amount: Money,
  pub total_paid: Money,
  pub remaining_amount: Money,
  #[serde(default)]
  pub is_deposit: bool,
  #[serde(default)]
  pub payments: Vec<PaymentRecord>,
}
