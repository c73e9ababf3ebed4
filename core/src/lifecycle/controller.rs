// lensflow/src/lifecycle/controller.rs

//! The order lifecycle controller: one state machine for every order view,
//! parameterised by the order snapshot and the operator's [`Role`].
//!
//! The controller owns the displayed snapshot. A flow always works on a copy of
//! it, and the snapshot only changes after the backend confirmed the change.
//! While a request is in flight the action surface is empty and every further
//! request is turned away with [`LifecycleError::Busy`].

use super::contexts::{AdvanceCtxData, CancelCtxData, PaymentCtxData, UploadCtxData};
use super::guards::{ensure_allowed, InFlight};
use super::outcome::{TransitionOutcome, TransitionResult};
use super::{register_lifecycle_flows, FlowOutcomeExt};
use crate::error::{ErrorKind, LifecycleError, LifecycleResult, ServiceError};
use crate::flow::{FlowContext, FlowRegistry};
use crate::model::{Action, ActionSet, Money, Order, OrderId, OrderStatus, PaymentContext, PendingTransition};
use crate::policy::Role;
use crate::ports::{ConfirmationImage, NotifyKind, Services};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct LifecycleController {
  services: Services,
  role: Role,
  snapshot: RwLock<Order>,
  pending: Mutex<Option<PendingTransition>>,
  updating: AtomicBool,
  flows: Arc<FlowRegistry<LifecycleError>>,
}

impl LifecycleController {
  /// Controller over an already fetched snapshot, with the stock flows.
  pub fn new(order: Order, role: Role, services: Services) -> Self {
    let flows = FlowRegistry::new();
    register_lifecycle_flows(&flows);
    Self::with_flows(order, role, services, Arc::new(flows))
  }

  /// Controller dispatching through `flows`, which must carry a flow for every
  /// lifecycle context type. Hosts use this to extend the stock flows.
  pub fn with_flows(order: Order, role: Role, services: Services, flows: Arc<FlowRegistry<LifecycleError>>) -> Self {
    Self {
      services,
      role,
      snapshot: RwLock::new(order),
      pending: Mutex::new(None),
      updating: AtomicBool::new(false),
      flows,
    }
  }

  /// Fetches the order and builds a controller over it.
  pub async fn load(order_id: OrderId, role: Role, services: Services) -> LifecycleResult<Self> {
    let order = services
      .orders
      .fetch_order(order_id)
      .await
      .map_err(|source| LifecycleError::Fetch { order_id, source })?;
    Ok(Self::new(order, role, services))
  }

  pub fn order(&self) -> Order {
    self.snapshot.read().clone()
  }

  pub fn status(&self) -> OrderStatus {
    self.snapshot.read().status
  }

  pub fn role(&self) -> Role {
    self.role
  }

  pub fn is_updating(&self) -> bool {
    self.updating.load(Ordering::Acquire)
  }

  /// What the operator may do right now. Empty while a request is in flight.
  pub fn available_actions(&self) -> ActionSet {
    if self.is_updating() {
      return ActionSet::empty();
    }
    self.role.available_actions(&self.snapshot.read())
  }

  pub fn pending(&self) -> Option<PendingTransition> {
    self.pending.lock().clone()
  }

  /// Opens the confirmation step for `action`. Nothing is executed until
  /// [`confirm`](Self::confirm). A later proposal replaces an earlier one.
  pub fn propose(&self, action: Action) -> LifecycleResult<PendingTransition> {
    let order = self.order();
    if self.is_updating() {
      return Err(LifecycleError::Busy { order_id: order.id });
    }
    if !action.requires_confirmation() {
      return Err(LifecycleError::precondition(
        order.id,
        action,
        order.status,
        "runs directly, there is nothing to confirm",
      ));
    }
    if let Err(e) = ensure_allowed(&order, self.role, action) {
      self.report_failure(&e);
      return Err(e);
    }

    let (target_status, amount) = match action {
      Action::Advance => (order.status.next().unwrap_or(order.status), None),
      Action::Cancel => (OrderStatus::Cancelled, None),
      _ => (order.status, Some(PaymentContext::for_order(&order).amount)),
    };
    let transition = PendingTransition {
      order_id: order.id,
      action,
      from_status: order.status,
      target_status,
      amount,
      requires_confirmation: true,
    };
    debug!(order_id = order.id, action = %action, "Transition proposed.");
    *self.pending.lock() = Some(transition.clone());
    Ok(transition)
  }

  /// Drops the open confirmation step, if any.
  pub fn dismiss(&self) -> Option<PendingTransition> {
    self.pending.lock().take()
  }

  /// Executes the transition opened by [`propose`](Self::propose). Checks run
  /// again against the snapshot as it is now.
  #[instrument(name = "LifecycleController::confirm", skip(self), fields(role = self.role.as_str()))]
  pub async fn confirm(&self) -> TransitionResult {
    let order_id = self.snapshot.read().id;
    let _in_flight = self.begin(order_id)?;
    let transition = self.pending.lock().take().ok_or(LifecycleError::NothingPending)?;
    let result = match transition.action {
      Action::Advance => self.advance_inner(transition.order_id, transition.target_status).await,
      Action::Cancel => self.cancel_inner(transition.order_id).await,
      Action::Pay => {
        let amount = transition.amount.unwrap_or(Money::ZERO);
        self.payment_inner(transition.order_id, amount).await
      }
      Action::UploadConfirmation => Err(LifecycleError::precondition(
        transition.order_id,
        Action::UploadConfirmation,
        transition.from_status,
        "uploads are not confirmed",
      )),
    };
    self.settle(result)
  }

  /// Persists `next_status`, which must be the status right after the current
  /// one. The snapshot moves only once the backend accepted the change.
  #[instrument(name = "LifecycleController::request_advance", skip(self), fields(role = self.role.as_str()))]
  pub async fn request_advance(&self, order_id: OrderId, next_status: OrderStatus) -> TransitionResult {
    let _in_flight = self.begin(order_id)?;
    let result = self.advance_inner(order_id, next_status).await;
    self.settle(result)
  }

  async fn advance_inner(&self, order_id: OrderId, next_status: OrderStatus) -> TransitionResult {
    let order = self.snapshot_for(order_id, Action::Advance)?;
    let from = order.status;
    let ctx = FlowContext::new(AdvanceCtxData {
      services: self.services.clone(),
      role: self.role,
      order,
      target: next_status,
      persisted: false,
    });
    self.flows.run(ctx.clone()).await?.completed("advance")?;

    let updated = ctx.read().order.clone();
    let to = updated.status;
    *self.snapshot.write() = updated;
    info!(order_id, from = %from, to = %to, "Order advanced.");
    self.notify(NotifyKind::Success, &format!("Order {} moved to {}.", order_id, to.as_str()));
    Ok(TransitionOutcome::StatusChanged { order_id, from, to })
  }

  /// Cancels a pending order by deleting it on the backend.
  #[instrument(name = "LifecycleController::request_cancel", skip(self), fields(role = self.role.as_str()))]
  pub async fn request_cancel(&self, order_id: OrderId) -> TransitionResult {
    let _in_flight = self.begin(order_id)?;
    let result = self.cancel_inner(order_id).await;
    self.settle(result)
  }

  async fn cancel_inner(&self, order_id: OrderId) -> TransitionResult {
    let order = self.snapshot_for(order_id, Action::Cancel)?;
    let ctx = FlowContext::new(CancelCtxData {
      services: self.services.clone(),
      role: self.role,
      order,
      deleted: false,
    });

    let run = match self.flows.run(ctx.clone()).await {
      Ok(outcome) => outcome.completed("cancel"),
      Err(e) => Err(e),
    };
    let deleted = ctx.read().deleted;
    match run {
      Ok(()) => {
        let cancelled = ctx.read().order.clone();
        *self.snapshot.write() = cancelled;
      }
      Err(e) if deleted => {
        // The record is gone. Whatever failed afterwards, the backend decides.
        warn!(order_id, error = %e, "Order deleted but local bookkeeping failed, reconciling.");
        self.reconcile_after_delete(order_id).await;
      }
      Err(e) => return Err(e),
    }
    self.pending.lock().take();
    info!(order_id, "Order cancelled.");
    self.notify(NotifyKind::Success, &format!("Order {} cancelled.", order_id));
    Ok(TransitionOutcome::Cancelled { order_id })
  }

  async fn reconcile_after_delete(&self, order_id: OrderId) {
    match self.services.orders.fetch_order(order_id).await {
      Ok(order) => *self.snapshot.write() = order,
      Err(ServiceError::NotFound(_)) => {
        let cancelled = self.snapshot.read().at_status(OrderStatus::Cancelled);
        *self.snapshot.write() = cancelled;
      }
      Err(e) => {
        warn!(order_id, error = %e, "Re-fetch after delete failed, showing order as cancelled.");
        let cancelled = self.snapshot.read().at_status(OrderStatus::Cancelled);
        *self.snapshot.write() = cancelled;
      }
    }
  }

  /// Hands the order to the payment gateway for `amount`, which must equal
  /// what is currently owed. On success the host has already been navigated
  /// away; the snapshot is left as is.
  #[instrument(name = "LifecycleController::request_payment", skip(self), fields(role = self.role.as_str()))]
  pub async fn request_payment(&self, order_id: OrderId, amount: Money) -> TransitionResult {
    let _in_flight = self.begin(order_id)?;
    let result = self.payment_inner(order_id, amount).await;
    self.settle(result)
  }

  async fn payment_inner(&self, order_id: OrderId, amount: Money) -> TransitionResult {
    let order = self.snapshot_for(order_id, Action::Pay)?;
    let ctx = FlowContext::new(PaymentCtxData {
      services: self.services.clone(),
      role: self.role,
      order,
      requested_amount: amount,
      payment: None,
      payment_url: None,
      token_saved: false,
      redirected: false,
    });
    self.flows.run(ctx.clone()).await?.completed("payment")?;

    let url = {
      let guard = ctx.read();
      match (&guard.payment_url, guard.redirected) {
        (Some(url), true) => url.clone(),
        _ => {
          return Err(LifecycleError::PaymentUrlUnavailable {
            order_id,
            reason: "flow finished without redirecting".to_string(),
          })
        }
      }
    };
    info!(order_id, amount = %amount, "Redirected to payment gateway.");
    self.notify(NotifyKind::Info, &format!("Redirecting to the payment page for {} VND.", amount));
    Ok(TransitionOutcome::RedirectIssued { order_id, amount, url })
  }

  /// Submits the kiosk handoff photo, then re-reads the order so the snapshot
  /// carries the stored image URL. Runs without a confirmation step.
  #[instrument(name = "LifecycleController::request_upload_confirmation", skip(self, image), fields(role = self.role.as_str()))]
  pub async fn request_upload_confirmation(&self, order_id: OrderId, image: ConfirmationImage) -> TransitionResult {
    let _in_flight = self.begin(order_id)?;
    let result = self.upload_inner(order_id, image).await;
    self.settle(result)
  }

  async fn upload_inner(&self, order_id: OrderId, image: ConfirmationImage) -> TransitionResult {
    let order = self.snapshot_for(order_id, Action::UploadConfirmation)?;
    let ctx = FlowContext::new(UploadCtxData {
      services: self.services.clone(),
      role: self.role,
      order,
      image: Some(image),
      uploaded: false,
    });
    self.flows.run(ctx.clone()).await?.completed("upload")?;

    let image_url = match self.reload(order_id).await {
      Ok(order) => order.delivery_confirmation_image_url,
      Err(e) => {
        warn!(order_id, error = %e, "Upload stored but the order could not be re-read.");
        None
      }
    };
    if image_url.is_none() {
      // The backend holds the photo; keep the gate closed until a reload shows its URL.
      self.snapshot.write().confirmation_uploaded = true;
    }
    info!(order_id, "Delivery confirmation uploaded.");
    self.notify(NotifyKind::Success, &format!("Delivery confirmation for order {} uploaded.", order_id));
    Ok(TransitionOutcome::ConfirmationUploaded { order_id, image_url })
  }

  /// Replaces the snapshot with the backend's current view of the order.
  pub async fn refresh(&self) -> LifecycleResult<Order> {
    let order_id = self.snapshot.read().id;
    let _in_flight = InFlight::acquire(&self.updating).ok_or(LifecycleError::Busy { order_id })?;
    self.reload(order_id).await
  }

  async fn reload(&self, order_id: OrderId) -> LifecycleResult<Order> {
    let order = self
      .services
      .orders
      .fetch_order(order_id)
      .await
      .map_err(|source| LifecycleError::Fetch { order_id, source })?;
    *self.snapshot.write() = order.clone();
    Ok(order)
  }

  /// Claims the in-flight flag. A refused claim issues no request and shows
  /// nothing to the user.
  fn begin(&self, order_id: OrderId) -> LifecycleResult<InFlight<'_>> {
    InFlight::acquire(&self.updating).ok_or_else(|| {
      debug!(order_id, "Request ignored, another one is in flight.");
      LifecycleError::Busy { order_id }
    })
  }

  /// Copy of the snapshot to run a flow on. The request must name the order
  /// this controller is showing.
  fn snapshot_for(&self, order_id: OrderId, action: Action) -> LifecycleResult<Order> {
    let order = self.snapshot.read().clone();
    if order.id != order_id {
      return Err(LifecycleError::precondition(
        order_id,
        action,
        order.status,
        format!("this view shows order {}", order.id),
      ));
    }
    Ok(order)
  }

  fn settle(&self, result: TransitionResult) -> TransitionResult {
    if let Err(e) = &result {
      self.report_failure(e);
    }
    result
  }

  fn report_failure(&self, error: &LifecycleError) {
    let kind = match error.kind() {
      ErrorKind::Busy => return,
      ErrorKind::PreconditionFailed | ErrorKind::NothingPending => NotifyKind::Warning,
      _ => NotifyKind::Error,
    };
    self.notify(kind, &error.to_string());
  }

  fn notify(&self, kind: NotifyKind, message: &str) {
    self.services.notifier.notify(kind, message);
  }
}

impl std::fmt::Debug for LifecycleController {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("LifecycleController")
      .field("role", &self.role)
      .field("snapshot", &*self.snapshot.read())
      .field("pending", &*self.pending.lock())
      .field("updating", &self.is_updating())
      .finish()
  }
}
