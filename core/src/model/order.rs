// lensflow/src/model/order.rs

use super::{Money, OrderStatus};
use serde::{Deserialize, Serialize};

pub type OrderId = i64;
pub type KioskId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeliveryMode {
  HomeDelivery,
  KioskPickup,
}

/// One line of an order as printed on the receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
  pub product_name: String,
  pub quantity: u32,
  pub unit_price: Money,
  #[serde(default)]
  pub lens_name: Option<String>,
}

/// Snapshot of an order as the backend reports it.
///
/// Construction goes through [`Order::new`] or deserialisation, both of which
/// enforce:
/// - `remaining_amount == total_amount - total_paid`, and it is never negative;
/// - `kiosk_id` is present exactly when `delivery_mode` is `KioskPickup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OrderWire", rename_all = "camelCase")]
pub struct Order {
  pub id: OrderId,
  pub code: String,
  pub status: OrderStatus,
  pub is_deposit: bool,
  pub total_amount: Money,
  pub total_paid: Money,
  pub remaining_amount: Money,
  pub delivery_mode: DeliveryMode,
  pub kiosk_id: Option<KioskId>,
  pub delivery_confirmation_image_url: Option<String>,
  pub items: Vec<OrderLine>,
  /// Set locally once an upload was accepted but the stored URL is not known
  /// yet. Never sent or read on the wire.
  #[serde(skip)]
  pub confirmation_uploaded: bool,
}

/// Field set accepted from the wire. `remainingAmount` is optional because some
/// endpoints omit it; when present it has to agree with the other two amounts.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderWire {
  id: OrderId,
  #[serde(default)]
  code: String,
  status: OrderStatus,
  #[serde(default)]
  is_deposit: bool,
  total_amount: Money,
  #[serde(default)]
  total_paid: Money,
  #[serde(default)]
  remaining_amount: Option<Money>,
  delivery_mode: DeliveryMode,
  #[serde(default)]
  kiosk_id: Option<KioskId>,
  #[serde(default)]
  delivery_confirmation_image_url: Option<String>,
  #[serde(default)]
  items: Vec<OrderLine>,
}

impl TryFrom<OrderWire> for Order {
  type Error = String;

  fn try_from(wire: OrderWire) -> Result<Self, Self::Error> {
    let mut order = Order::new(
      wire.id,
      wire.code,
      wire.status,
      wire.delivery_mode,
      wire.kiosk_id,
      wire.total_amount,
      wire.total_paid,
    )?;
    if let Some(remaining) = wire.remaining_amount {
      if remaining != order.remaining_amount {
        return Err(format!(
          "order {}: remainingAmount {} does not match totalAmount {} - totalPaid {}",
          order.id, remaining, order.total_amount, order.total_paid
        ));
      }
    }
    order.is_deposit = wire.is_deposit;
    order.delivery_confirmation_image_url = wire.delivery_confirmation_image_url.filter(|url| !url.trim().is_empty());
    order.items = wire.items;
    Ok(order)
  }
}

impl Order {
  /// Builds a full-payment order without confirmation image or line items.
  /// Use the `with_*` helpers for the rest.
  pub fn new(
    id: OrderId,
    code: impl Into<String>,
    status: OrderStatus,
    delivery_mode: DeliveryMode,
    kiosk_id: Option<KioskId>,
    total_amount: Money,
    total_paid: Money,
  ) -> Result<Self, String> {
    match (delivery_mode, kiosk_id) {
      (DeliveryMode::KioskPickup, None) => return Err(format!("order {}: kiosk pickup without kioskId", id)),
      (DeliveryMode::HomeDelivery, Some(kiosk)) => {
        return Err(format!("order {}: home delivery must not carry kioskId {}", id, kiosk))
      }
      _ => {}
    }
    let remaining_amount = total_amount
      .checked_sub(total_paid)
      .filter(|remaining| remaining.amount() >= 0)
      .ok_or_else(|| format!("order {}: totalPaid {} exceeds totalAmount {}", id, total_paid, total_amount))?;
    Ok(Self {
      id,
      code: code.into(),
      status,
      is_deposit: false,
      total_amount,
      total_paid,
      remaining_amount,
      delivery_mode,
      kiosk_id,
      delivery_confirmation_image_url: None,
      items: Vec::new(),
      confirmation_uploaded: false,
    })
  }

  pub fn with_deposit(mut self, is_deposit: bool) -> Self {
    self.is_deposit = is_deposit;
    self
  }

  pub fn with_confirmation_image(mut self, url: impl Into<String>) -> Self {
    self.delivery_confirmation_image_url = Some(url.into());
    self
  }

  pub fn with_items(mut self, items: Vec<OrderLine>) -> Self {
    self.items = items;
    self
  }

  pub fn is_kiosk_pickup(&self) -> bool {
    self.delivery_mode == DeliveryMode::KioskPickup
  }

  pub fn has_confirmation_image(&self) -> bool {
    self.delivery_confirmation_image_url.is_some() || self.confirmation_uploaded
  }

  /// Copy of this snapshot at another status. Amounts and context are kept.
  pub fn at_status(&self, status: OrderStatus) -> Order {
    Order { status, ..self.clone() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn wire(remaining: Option<i64>, mode: &str, kiosk: Option<i64>) -> serde_json::Value {
    let mut value = json!({
      "id": 482,
      "code": "VSU482",
      "status": 2,
      "isDeposit": true,
      "totalAmount": 500000,
      "totalPaid": 300000,
      "deliveryMode": mode,
      "kioskId": kiosk,
      "deliveryConfirmationImageUrl": "",
      "items": [{ "productName": "Rayban RB2140", "quantity": 1, "unitPrice": 500000, "lensName": "Essilor 1.60" }]
    });
    if let Some(remaining) = remaining {
      value["remainingAmount"] = json!(remaining);
    }
    value
  }

  #[test]
  fn decodes_backend_shape() {
    let order: Order = serde_json::from_value(wire(Some(200_000), "kioskPickup", Some(7))).unwrap();
    assert_eq!(order.status, OrderStatus::Shipping);
    assert_eq!(order.remaining_amount, Money(200_000));
    assert_eq!(order.kiosk_id, Some(7));
    assert!(!order.has_confirmation_image());
    assert_eq!(order.items[0].lens_name.as_deref(), Some("Essilor 1.60"));

    let derived: Order = serde_json::from_value(wire(None, "kioskPickup", Some(7))).unwrap();
    assert_eq!(derived.remaining_amount, Money(200_000));
  }

  #[test]
  fn rejects_inconsistent_amounts_and_kiosk_context() {
    assert!(serde_json::from_value::<Order>(wire(Some(100_000), "kioskPickup", Some(7))).is_err());
    assert!(serde_json::from_value::<Order>(wire(Some(200_000), "kioskPickup", None)).is_err());
    assert!(serde_json::from_value::<Order>(wire(Some(200_000), "homeDelivery", Some(7))).is_err());
    assert!(Order::new(1, "X", OrderStatus::Pending, DeliveryMode::HomeDelivery, None, Money(10), Money(11)).is_err());
  }

  #[test]
  fn unknown_status_code_is_rejected() {
    let mut value = wire(None, "homeDelivery", None);
    value["status"] = json!(9);
    assert!(serde_json::from_value::<Order>(value).is_err());
  }
}
