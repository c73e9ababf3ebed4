// lensflow/src/lifecycle/outcome.rs

use crate::error::LifecycleResult;
use crate::model::{Money, OrderId, OrderStatus};

/// What a successful controller operation did. Hosts translate this into
/// their own update mechanism: `StatusChanged` is the status-update signal,
/// `Cancelled` the order-deleted signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
  StatusChanged {
    order_id: OrderId,
    from: OrderStatus,
    to: OrderStatus,
  },
  Cancelled {
    order_id: OrderId,
  },
  /// The host has been sent to the gateway. The outcome of the payment
  /// arrives later, through the payment-return correlator.
  RedirectIssued {
    order_id: OrderId,
    amount: Money,
    url: String,
  },
  ConfirmationUploaded {
    order_id: OrderId,
    /// Image URL from the refreshed order, when the refresh succeeded.
    image_url: Option<String>,
  },
}

impl TransitionOutcome {
  pub fn order_id(&self) -> OrderId {
    match self {
      TransitionOutcome::StatusChanged { order_id, .. }
      | TransitionOutcome::Cancelled { order_id }
      | TransitionOutcome::RedirectIssued { order_id, .. }
      | TransitionOutcome::ConfirmationUploaded { order_id, .. } => *order_id,
    }
  }

  /// The status the host should now display, if it changed.
  pub fn new_status(&self) -> Option<OrderStatus> {
    match self {
      TransitionOutcome::StatusChanged { to, .. } => Some(*to),
      TransitionOutcome::Cancelled { .. } => Some(OrderStatus::Cancelled),
      TransitionOutcome::RedirectIssued { .. } | TransitionOutcome::ConfirmationUploaded { .. } => None,
    }
  }
}

pub type TransitionResult = LifecycleResult<TransitionOutcome>;
