// lensflow/src/error.rs

//! Error types, one per layer: the flow engine, the leaf ports, and the
//! lifecycle controller / payment-return correlator that decide what the user
//! gets to see.

use crate::model::{Action, OrderId, OrderStatus};
use thiserror::Error;

/// Engine-level failures. These indicate wiring problems rather than business
/// outcomes and surface inside the caller's error type via `From<FlowError>`.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("flow '{flow}': required step '{step_name}' has no handlers")]
  HandlerMissing { flow: String, step_name: String },

  #[error("no flow registered for context type {context_type}")]
  NotRegistered { context_type: String },

  #[error("flow '{flow}': context type mismatch, expected {expected_type}")]
  TypeMismatch { flow: String, expected_type: String },

  #[error("flow engine: {0}")]
  Internal(String),
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;

/// Failure reported by a leaf port (order service, payment gateway, uploader,
/// resume store). Leaves report, they never decide recovery.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
  #[error("transport failure: {0}")]
  Transport(String),

  #[error("backend rejected the request ({status}): {message}")]
  Rejected { status: u16, message: String },

  #[error("not found: {0}")]
  NotFound(String),

  #[error("malformed response: {0}")]
  Decode(String),

  #[error("storage failure: {0}")]
  Storage(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Coarse classification handed to hosts that only need to pick a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  PreconditionFailed,
  TransitionFailed,
  PaymentUrlUnavailable,
  UploadFailed,
  CorrelationFailed,
  Busy,
  NothingPending,
  FetchFailed,
  Internal,
}

#[derive(Debug, Error)]
pub enum LifecycleError {
  /// The action is not legal for the order's current state or context.
  /// Always raised before any network call.
  #[error("{action} is not allowed for order {order_id} while {status}: {reason}")]
  PreconditionFailed {
    order_id: OrderId,
    action: Action,
    status: OrderStatus,
    reason: String,
  },

  #[error("status change of order {order_id} to {target} failed: {source}")]
  TransitionFailed {
    order_id: OrderId,
    target: OrderStatus,
    #[source]
    source: ServiceError,
  },

  #[error("no usable payment url for order {order_id}: {reason}")]
  PaymentUrlUnavailable { order_id: OrderId, reason: String },

  #[error("delivery confirmation upload for order {order_id} failed: {source}")]
  UploadFailed {
    order_id: OrderId,
    #[source]
    source: ServiceError,
  },

  #[error("payment return could not be resolved: {reason}")]
  CorrelationFailed { reason: String },

  #[error("order {order_id} already has a request in flight")]
  Busy { order_id: OrderId },

  #[error("no transition is awaiting confirmation")]
  NothingPending,

  #[error("order {order_id} could not be loaded: {source}")]
  Fetch {
    order_id: OrderId,
    #[source]
    source: ServiceError,
  },

  #[error("flow engine error: {source}")]
  Flow {
    #[from]
    source: FlowError,
  },
}

impl LifecycleError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      LifecycleError::PreconditionFailed { .. } => ErrorKind::PreconditionFailed,
      LifecycleError::TransitionFailed { .. } => ErrorKind::TransitionFailed,
      LifecycleError::PaymentUrlUnavailable { .. } => ErrorKind::PaymentUrlUnavailable,
      LifecycleError::UploadFailed { .. } => ErrorKind::UploadFailed,
      LifecycleError::CorrelationFailed { .. } => ErrorKind::CorrelationFailed,
      LifecycleError::Busy { .. } => ErrorKind::Busy,
      LifecycleError::NothingPending => ErrorKind::NothingPending,
      LifecycleError::Fetch { .. } => ErrorKind::FetchFailed,
      LifecycleError::Flow { .. } => ErrorKind::Internal,
    }
  }

  pub(crate) fn precondition(
    order_id: OrderId,
    action: Action,
    status: OrderStatus,
    reason: impl Into<String>,
  ) -> Self {
    LifecycleError::PreconditionFailed {
      order_id,
      action,
      status,
      reason: reason.into(),
    }
  }

  pub(crate) fn correlation(reason: impl Into<String>) -> Self {
    LifecycleError::CorrelationFailed { reason: reason.into() }
  }
}

pub type LifecycleResult<T> = std::result::Result<T, LifecycleError>;
