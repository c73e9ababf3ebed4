// lensflow/src/correlator/mod.rs

//! Payment return correlator.
//!
//! Runs on the page load that follows the gateway redirect, when none of the
//! controller's in-memory state survives. It consumes the resume token, reads
//! the gateway's verdict from the return URL, and only on a verified success
//! fetches the order and its payments to build a [`ReceiptView`]. Any failure
//! sends the user back to the order list.

pub mod params;
pub mod receipt;
pub mod resolve_flow;

pub use params::GatewayReturn;
pub use receipt::ReceiptView;
pub use resolve_flow::ResolveCtxData;

use crate::error::{LifecycleError, LifecycleResult};
use crate::flow::{FlowContext, FlowOutcome, FlowRegistry};
use crate::ports::{Destination, NotifyKind, Services};
use crate::settings::LifecycleSettings;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
  Receipt(ReceiptView),
  /// This correlator already ran. Nothing was fetched, shown or navigated.
  AlreadyResolved,
}

/// One per page load. `resolve` acts at most once however often the host
/// calls it.
pub struct PaymentReturnCorrelator {
  services: Services,
  settings: LifecycleSettings,
  resolved: AtomicBool,
  flows: Arc<FlowRegistry<LifecycleError>>,
}

impl PaymentReturnCorrelator {
  pub fn new(services: Services, settings: LifecycleSettings) -> Self {
    let flows = FlowRegistry::new();
    resolve_flow::register_resolve_flow(&flows);
    Self::with_flows(services, settings, Arc::new(flows))
  }

  /// Correlator dispatching through `flows`, which must carry a flow for
  /// [`ResolveCtxData`].
  pub fn with_flows(services: Services, settings: LifecycleSettings, flows: Arc<FlowRegistry<LifecycleError>>) -> Self {
    Self {
      services,
      settings,
      resolved: AtomicBool::new(false),
      flows,
    }
  }

  pub fn is_resolved(&self) -> bool {
    self.resolved.load(Ordering::Acquire)
  }

  /// Resolves the gateway return carried by `return_url` (full URL or query
  /// string). On success navigates to the receipt, otherwise to the order list
  /// with an error notification and a `CorrelationFailed` result.
  #[instrument(name = "PaymentReturnCorrelator::resolve", skip_all)]
  pub async fn resolve(&self, return_url: &str) -> LifecycleResult<Resolution> {
    if self.resolved.swap(true, Ordering::AcqRel) {
      debug!("Payment return already resolved, ignoring.");
      return Ok(Resolution::AlreadyResolved);
    }

    let ctx = FlowContext::new(ResolveCtxData::new(
      self.services.clone(),
      self.settings.clone(),
      return_url,
    ));
    let outcome = self.flows.run(ctx.clone()).await;
    let receipt = match outcome {
      Ok(FlowOutcome::Completed) => ctx.update(|data| data.receipt.take()),
      Ok(FlowOutcome::Halted) => None,
      Err(e) => return Err(self.fail(e)),
    };

    match receipt {
      Some(receipt) => {
        info!(order_id = receipt.order_id, "Showing payment receipt.");
        self.services.notifier.notify(
          NotifyKind::Success,
          &format!("Payment for order {} confirmed.", receipt.order_id),
        );
        self.services.navigator.navigate(Destination::Receipt {
          order_id: receipt.order_id,
        });
        Ok(Resolution::Receipt(receipt))
      }
      None => Err(self.fail(LifecycleError::correlation("resolution stopped before a receipt was built"))),
    }
  }

  fn fail(&self, error: LifecycleError) -> LifecycleError {
    let error = match error {
      e @ LifecycleError::CorrelationFailed { .. } => e,
      other => LifecycleError::correlation(other.to_string()),
    };
    error!(error = %error, "Payment return could not be resolved.");
    self.services.notifier.notify(NotifyKind::Error, &error.to_string());
    self.services.navigator.navigate(Destination::OrderList);
    error
  }
}
