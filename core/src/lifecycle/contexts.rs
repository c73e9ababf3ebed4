// lensflow/src/lifecycle/contexts.rs

//! Context data for each lifecycle flow. Every struct starts from a copy of the
//! controller's snapshot; the controller only folds results back into its own
//! snapshot after the flow has completed.

use crate::model::{Money, Order, OrderStatus, PaymentContext};
use crate::policy::Role;
use crate::ports::{ConfirmationImage, Services};

#[derive(Clone)]
pub struct AdvanceCtxData {
  pub services: Services,
  pub role: Role,
  pub order: Order,
  pub target: OrderStatus,
  /// Set once the backend accepted the new status.
  pub persisted: bool,
}

#[derive(Clone)]
pub struct CancelCtxData {
  pub services: Services,
  pub role: Role,
  pub order: Order,
  /// Set as soon as the backend deleted the record. From then on the backend
  /// is authoritative, whatever happens locally.
  pub deleted: bool,
}

#[derive(Clone)]
pub struct PaymentCtxData {
  pub services: Services,
  pub role: Role,
  pub order: Order,
  pub requested_amount: Money,
  pub payment: Option<PaymentContext>,
  pub payment_url: Option<String>,
  pub token_saved: bool,
  pub redirected: bool,
}

#[derive(Clone)]
pub struct UploadCtxData {
  pub services: Services,
  pub role: Role,
  pub order: Order,
  /// Taken by the submit step so the bytes are not cloned per handler.
  pub image: Option<ConfirmationImage>,
  pub uploaded: bool,
}
