// lensflow/src/lifecycle/advance_flow.rs

use super::contexts::AdvanceCtxData;
use super::guards::ensure_allowed;
use crate::error::LifecycleError;
use crate::flow::{Flow, FlowContext, FlowRegistry, StepControl, StepDef};
use crate::model::Action;
use tracing::{info, warn};

pub const FLOW_NAME: &str = "advance_order";

pub fn advance_flow() -> Flow<AdvanceCtxData, LifecycleError> {
  let mut flow = Flow::new(
    FLOW_NAME,
    vec![
      StepDef::required("verify_advance_allowed"),
      StepDef::required("persist_status"),
      StepDef::required("record_new_status"),
    ],
  );

  flow.on("verify_advance_allowed", |ctx: FlowContext<AdvanceCtxData>| async move {
    let guard = ctx.read();
    ensure_allowed(&guard.order, guard.role, Action::Advance)?;
    // Only one step forward, never sideways or back.
    if guard.order.status.next() != Some(guard.target) {
      return Err(LifecycleError::precondition(
        guard.order.id,
        Action::Advance,
        guard.order.status,
        format!("{} is not the next status", guard.target),
      ));
    }
    Ok::<_, LifecycleError>(StepControl::Continue)
  });

  flow.on("persist_status", |ctx: FlowContext<AdvanceCtxData>| async move {
    let (orders, order_id, target) = {
      let guard = ctx.read();
      (guard.services.orders.clone(), guard.order.id, guard.target)
    };
    info!(order_id, target = %target, "Persisting status change.");
    match orders.update_status(order_id, target).await {
      Ok(()) => {
        ctx.write().persisted = true;
        Ok(StepControl::Continue)
      }
      Err(source) => {
        warn!(order_id, target = %target, error = %source, "Backend refused status change.");
        Err(LifecycleError::TransitionFailed {
          order_id,
          target,
          source,
        })
      }
    }
  });

  flow.on("record_new_status", |ctx: FlowContext<AdvanceCtxData>| async move {
    ctx.update(|data| data.order.status = data.target);
    Ok::<_, LifecycleError>(StepControl::Continue)
  });

  flow
}

pub fn register_advance_flow(registry: &FlowRegistry<LifecycleError>) {
  registry.register(advance_flow());
}
