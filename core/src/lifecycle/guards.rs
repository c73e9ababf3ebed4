// lensflow/src/lifecycle/guards.rs

use crate::error::{LifecycleError, LifecycleResult};
use crate::model::{Action, Order};
use crate::policy::{self, Role};
use std::sync::atomic::{AtomicBool, Ordering};

/// Fails with `PreconditionFailed` unless `role` may take `action` on `order`
/// right now.
pub(crate) fn ensure_allowed(order: &Order, role: Role, action: Action) -> LifecycleResult<()> {
  if !role.permits(action) {
    return Err(LifecycleError::precondition(
      order.id,
      action,
      order.status,
      format!("the {} role may not {}", role.as_str(), action),
    ));
  }
  match policy::denial_reason(order, action) {
    Some(reason) => Err(LifecycleError::precondition(order.id, action, order.status, reason)),
    None => Ok(()),
  }
}

/// Marks a request as outstanding for as long as it lives. Dropping it, on
/// success, failure or cancellation of the future, re-enables the action
/// surface.
pub(crate) struct InFlight<'a> {
  flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
  /// `None` when another request already holds the flag.
  pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
    flag
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .ok()
      .map(|_| InFlight { flag })
  }
}

impl Drop for InFlight<'_> {
  fn drop(&mut self) {
    self.flag.store(false, Ordering::Release);
  }
}
