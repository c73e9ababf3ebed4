// lensflow/src/ports.rs

//! Capabilities the lifecycle core needs from its host. Each one is a narrow
//! trait so the core stays testable without a backend or a rendering
//! environment.

use crate::error::ServiceResult;
use crate::model::{Money, Order, OrderId, OrderStatus, PaymentDetails};
use crate::resume::ResumeToken;
use async_trait::async_trait;
use std::sync::Arc;

/// Read/update access to orders on the backend. No business logic.
#[async_trait]
pub trait OrderService: Send + Sync {
  async fn fetch_order(&self, order_id: OrderId) -> ServiceResult<Order>;

  async fn update_status(&self, order_id: OrderId, new_status: OrderStatus) -> ServiceResult<()>;

  /// Cancel path: removes the order record. Only called for `Pending` orders.
  async fn delete_order(&self, order_id: OrderId) -> ServiceResult<()>;
}

/// Hosted payment page provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
  /// Asks the backend for a hosted-payment-page URL charging `amount`.
  async fn request_payment_url(&self, order_id: OrderId, amount: Money) -> ServiceResult<String>;

  async fn fetch_payment_details(&self, order_id: OrderId) -> ServiceResult<PaymentDetails>;
}

/// Binary image proving handoff at a kiosk.
#[derive(Clone, PartialEq, Eq)]
pub struct ConfirmationImage {
  pub file_name: String,
  pub content_type: String,
  pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ConfirmationImage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ConfirmationImage")
      .field("file_name", &self.file_name)
      .field("content_type", &self.content_type)
      .field("len", &self.bytes.len())
      .finish()
  }
}

#[async_trait]
pub trait ConfirmationUploader: Send + Sync {
  async fn upload_confirmation(&self, order_id: OrderId, image: ConfirmationImage) -> ServiceResult<()>;
}

/// Session-scoped store that survives the navigation to the payment gateway
/// and back. One writer (the controller, just before redirecting) and one
/// reader (the correlator, on return).
pub trait ResumeStore: Send + Sync {
  /// Stores `token`, superseding whatever an earlier attempt left behind.
  fn save(&self, token: ResumeToken) -> ServiceResult<()>;

  /// Returns the stored token and removes it. A second call yields `None`.
  fn load_once(&self) -> ServiceResult<Option<ResumeToken>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
  Success,
  Info,
  Warning,
  Error,
}

/// Toast/dialog surface of the host.
pub trait Notifier: Send + Sync {
  fn notify(&self, kind: NotifyKind, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
  /// Full-page navigation away from the application.
  External(String),
  OrderList,
  Receipt { order_id: OrderId },
}

pub trait Navigator: Send + Sync {
  fn navigate(&self, destination: Destination);
}

/// Everything the controller and correlator talk to, bundled so flow contexts
/// can carry one cheap clone.
#[derive(Clone)]
pub struct Services {
  pub orders: Arc<dyn OrderService>,
  pub payments: Arc<dyn PaymentGateway>,
  pub uploader: Arc<dyn ConfirmationUploader>,
  pub resume: Arc<dyn ResumeStore>,
  pub notifier: Arc<dyn Notifier>,
  pub navigator: Arc<dyn Navigator>,
}
