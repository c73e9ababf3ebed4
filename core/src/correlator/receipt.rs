// lensflow/src/correlator/receipt.rs

use crate::model::{DeliveryMode, KioskId, Money, Order, OrderId, OrderLine, OrderStatus, PaymentDetails, PaymentRecord};
use serde::Serialize;

/// Consolidated post-payment view. Every figure comes from the order and
/// payment services, never from the gateway's return parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptView {
  pub order_id: OrderId,
  pub order_code: String,
  pub status: OrderStatus,
  /// Status recorded when the payment was started, if the resume token was
  /// still valid.
  pub pre_payment_status: Option<OrderStatus>,
  pub is_deposit: bool,
  pub total_amount: Money,
  pub total_paid: Money,
  pub remaining_amount: Money,
  pub delivery_mode: DeliveryMode,
  pub kiosk_id: Option<KioskId>,
  pub items: Vec<OrderLine>,
  pub payments: Vec<PaymentRecord>,
}

impl ReceiptView {
  /// Amounts and deposit flag are taken from `payment`, the payment service
  /// being authoritative for them.
  pub fn assemble(
    order: &Order,
    payment: &PaymentDetails,
    pre_payment_status: Option<OrderStatus>,
  ) -> Result<Self, String> {
    if payment.order_id != order.id {
      return Err(format!(
        "payment details belong to order {}, not {}",
        payment.order_id, order.id
      ));
    }
    Ok(Self {
      order_id: order.id,
      order_code: order.code.clone(),
      status: order.status,
      pre_payment_status,
      is_deposit: payment.is_deposit,
      total_amount: payment.total_amount,
      total_paid: payment.total_paid,
      remaining_amount: payment.remaining_amount,
      delivery_mode: order.delivery_mode,
      kiosk_id: order.kiosk_id,
      items: order.items.clone(),
      payments: payment.payments.clone(),
    })
  }

  pub fn is_settled(&self) -> bool {
    self.remaining_amount.is_zero()
  }
}
