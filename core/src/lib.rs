// src/lib.rs

//! LensFlow: order fulfillment lifecycle for an eyewear retail desk.
//!
//! The crate holds the parts of the order workflow that carry actual rules:
//!  - Which actions an order offers in its current state, per delivery mode,
//!    deposit flag and operator role ([`policy`]).
//!  - A lifecycle controller that runs advance, cancel, pay and upload with a
//!    confirmation step and an in-flight guard ([`lifecycle`]).
//!  - A correlator that resolves the return from an external payment gateway
//!    against authoritative order and payment state ([`correlator`]).
//!  - Presentation data per status ([`display`]).
//!
//! Everything the core talks to (backend, gateway, uploader, resume store,
//! notifications, navigation) is a trait in [`ports`], implemented by the host.

pub mod correlator;
pub mod display;
pub mod error;
pub mod flow;
pub mod lifecycle;
pub mod model;
pub mod policy;
pub mod ports;
pub mod resume;
pub mod settings;

// --- Re-exports for the Public API ---

pub use crate::correlator::{GatewayReturn, PaymentReturnCorrelator, ReceiptView, Resolution};
pub use crate::error::{ErrorKind, FlowError, LifecycleError, LifecycleResult, ServiceError, ServiceResult};
pub use crate::flow::{Flow, FlowContext, FlowOutcome, FlowRegistry, StepControl, StepDef};
pub use crate::lifecycle::{LifecycleController, TransitionOutcome, TransitionResult};
pub use crate::model::{
  Action, ActionSet, DeliveryMode, Money, Order, OrderId, OrderLine, OrderStatus, PaymentContext, PaymentDetails,
  PaymentRecord, PendingTransition,
};
pub use crate::policy::{available_actions, Role};
pub use crate::ports::{
  ConfirmationImage, ConfirmationUploader, Destination, Navigator, Notifier, NotifyKind, OrderService, PaymentGateway,
  ResumeStore, Services,
};
pub use crate::resume::{MemoryResumeStore, ResumeToken};
pub use crate::settings::{GatewayReturnRules, LifecycleSettings};
