// lensflow/src/lifecycle/mod.rs

//! Order lifecycle controller and the flows it runs.

pub mod advance_flow;
pub mod cancel_flow;
pub mod contexts;
pub mod controller;
pub(crate) mod guards;
pub mod outcome;
pub mod payment_flow;
pub mod upload_flow;

pub use contexts::{AdvanceCtxData, CancelCtxData, PaymentCtxData, UploadCtxData};
pub use controller::LifecycleController;
pub use outcome::{TransitionOutcome, TransitionResult};

use crate::error::{FlowError, LifecycleError};
use crate::flow::{FlowOutcome, FlowRegistry};

/// Registers the stock advance, cancel, payment and upload flows.
pub fn register_lifecycle_flows(registry: &FlowRegistry<LifecycleError>) {
  advance_flow::register_advance_flow(registry);
  cancel_flow::register_cancel_flow(registry);
  payment_flow::register_payment_flow(registry);
  upload_flow::register_upload_flow(registry);
}

/// A lifecycle operation needs its flow to run to the end; a halted flow
/// changed nothing the controller can report.
pub(crate) trait FlowOutcomeExt {
  fn completed(self, operation: &str) -> Result<(), LifecycleError>;
}

impl FlowOutcomeExt for FlowOutcome {
  fn completed(self, operation: &str) -> Result<(), LifecycleError> {
    match self {
      FlowOutcome::Completed => Ok(()),
      FlowOutcome::Halted => Err(LifecycleError::from(FlowError::Internal(format!(
        "{} flow halted before completing",
        operation
      )))),
    }
  }
}
