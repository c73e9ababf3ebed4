// lensflow/src/lifecycle/cancel_flow.rs

use super::contexts::CancelCtxData;
use super::guards::ensure_allowed;
use crate::error::LifecycleError;
use crate::flow::{Flow, FlowContext, FlowRegistry, StepControl, StepDef};
use crate::model::{Action, OrderStatus};
use tracing::{info, warn};

pub const FLOW_NAME: &str = "cancel_order";

pub fn cancel_flow() -> Flow<CancelCtxData, LifecycleError> {
  let mut flow = Flow::new(
    FLOW_NAME,
    vec![
      StepDef::required("verify_cancel_allowed"),
      StepDef::required("delete_order_record"),
      StepDef::required("record_cancellation"),
    ],
  );

  flow.on("verify_cancel_allowed", |ctx: FlowContext<CancelCtxData>| async move {
    let guard = ctx.read();
    ensure_allowed(&guard.order, guard.role, Action::Cancel)?;
    Ok::<_, LifecycleError>(StepControl::Continue)
  });

  flow.on("delete_order_record", |ctx: FlowContext<CancelCtxData>| async move {
    let (orders, order_id) = {
      let guard = ctx.read();
      (guard.services.orders.clone(), guard.order.id)
    };
    info!(order_id, "Deleting pending order.");
    if let Err(source) = orders.delete_order(order_id).await {
      warn!(order_id, error = %source, "Backend refused to delete order.");
      return Err(LifecycleError::TransitionFailed {
        order_id,
        target: OrderStatus::Cancelled,
        source,
      });
    }
    ctx.write().deleted = true;
    Ok::<_, LifecycleError>(StepControl::Continue)
  });

  flow.on("record_cancellation", |ctx: FlowContext<CancelCtxData>| async move {
    ctx.update(|data| data.order.status = OrderStatus::Cancelled);
    Ok::<_, LifecycleError>(StepControl::Continue)
  });

  flow
}

pub fn register_cancel_flow(registry: &FlowRegistry<LifecycleError>) {
  registry.register(cancel_flow());
}
