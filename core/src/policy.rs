// lensflow/src/policy.rs

//! Which actions are legal for an order snapshot, and which of those a role
//! may take.
//!
//! Rules, by status:
//! - `Pending`: advance, cancel, and pay while money is still owed.
//! - `Processing`, `Delivered`: advance.
//! - `Shipping`, home delivery: advance. Payment and delivery confirmation for
//!   home delivery are handled by the backend, not gated here.
//! - `Shipping`, kiosk pickup: payment first, then the confirmation photo, then
//!   advance. A deposit order with a balance offers only `Pay`; once nothing is
//!   owed (or the order is not a deposit order) and no photo is on file, only
//!   `UploadConfirmation`; with the photo on file, only `Advance`.
//! - `Completed`, `Cancelled`: nothing.

use crate::model::{Action, ActionSet, Order, OrderStatus};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Legal actions for `order`. Pure: same snapshot in, same set out.
pub fn available_actions(order: &Order) -> ActionSet {
  let mut actions = ActionSet::empty();
  let owes = order.remaining_amount.is_positive();

  match order.status {
    OrderStatus::Pending => {
      actions.insert(Action::Advance);
      actions.insert(Action::Cancel);
      if owes {
        actions.insert(Action::Pay);
      }
    }
    OrderStatus::Processing | OrderStatus::Delivered => actions.insert(Action::Advance),
    OrderStatus::Shipping if order.is_kiosk_pickup() => {
      if order.is_deposit && owes {
        actions.insert(Action::Pay);
      } else if !order.has_confirmation_image() {
        actions.insert(Action::UploadConfirmation);
      } else {
        actions.insert(Action::Advance);
      }
    }
    OrderStatus::Shipping => actions.insert(Action::Advance),
    OrderStatus::Completed | OrderStatus::Cancelled => {}
  }

  actions
}

/// Human-readable reason `action` is not in [`available_actions`] for `order`.
/// `None` when the action is available.
pub fn denial_reason(order: &Order, action: Action) -> Option<String> {
  if available_actions(order).contains(action) {
    return None;
  }
  let reason = match (action, order.status) {
    (_, status) if status.is_terminal() => format!("order is {}", status.as_str()),
    (Action::Cancel, _) => "only pending orders can be cancelled".to_string(),
    (Action::Pay, _) if !order.remaining_amount.is_positive() => "nothing left to pay".to_string(),
    (Action::Pay, OrderStatus::Shipping) if !order.is_kiosk_pickup() => {
      "home-delivery balances are collected by the carrier".to_string()
    }
    (Action::Pay, OrderStatus::Shipping) => "only deposit orders collect a balance at pickup".to_string(),
    (Action::Pay, _) => "payment is only taken while pending or shipping".to_string(),
    (Action::UploadConfirmation, OrderStatus::Shipping) if !order.is_kiosk_pickup() => {
      "home-delivery orders do not take a confirmation photo".to_string()
    }
    (Action::UploadConfirmation, OrderStatus::Shipping) if order.has_confirmation_image() => {
      "a confirmation photo is already on file".to_string()
    }
    (Action::UploadConfirmation, OrderStatus::Shipping) => "the remaining balance must be paid first".to_string(),
    (Action::UploadConfirmation, _) => "confirmation photos are taken while shipping".to_string(),
    (Action::Advance, OrderStatus::Shipping) if order.is_deposit && order.remaining_amount.is_positive() => {
      "the remaining balance must be paid first".to_string()
    }
    (Action::Advance, OrderStatus::Shipping) => "a delivery confirmation photo is required first".to_string(),
    (Action::Advance, _) => "no further status to advance to".to_string(),
  };
  Some(reason)
}

/// Who is driving the order view. Each role sees the legal actions it is
/// permitted to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
  Admin,
  Staff,
  /// Delivery staff working a kiosk.
  Shipper,
}

impl Role {
  pub fn permits(&self, action: Action) -> bool {
    match self {
      Role::Admin => true,
      Role::Staff => matches!(action, Action::Advance | Action::Cancel | Action::Pay),
      Role::Shipper => matches!(action, Action::Advance | Action::Pay | Action::UploadConfirmation),
    }
  }

  /// Legal actions for `order` narrowed to what this role may take.
  pub fn available_actions(&self, order: &Order) -> ActionSet {
    let mut actions = available_actions(order);
    actions.retain(|action| self.permits(*action));
    actions
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Role::Admin => "admin",
      Role::Staff => "staff",
      Role::Shipper => "shipper",
    }
  }
}

impl FromStr for Role {
  type Err = String;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value.trim().to_ascii_lowercase().as_str() {
      "admin" => Ok(Role::Admin),
      "staff" => Ok(Role::Staff),
      "shipper" | "kiosk" => Ok(Role::Shipper),
      other => Err(format!("unknown role '{}'", other)),
    }
  }
}
