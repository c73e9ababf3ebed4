// lensflow/src/lifecycle/upload_flow.rs

use super::contexts::UploadCtxData;
use super::guards::ensure_allowed;
use crate::error::LifecycleError;
use crate::flow::{Flow, FlowContext, FlowRegistry, StepControl, StepDef};
use crate::model::Action;
use tracing::{info, warn};

pub const FLOW_NAME: &str = "upload_delivery_confirmation";

pub fn upload_flow() -> Flow<UploadCtxData, LifecycleError> {
  let mut flow = Flow::new(
    FLOW_NAME,
    vec![
      StepDef::required("verify_upload_allowed"),
      StepDef::required("submit_confirmation_image"),
    ],
  );

  flow.on("verify_upload_allowed", |ctx: FlowContext<UploadCtxData>| async move {
    let guard = ctx.read();
    ensure_allowed(&guard.order, guard.role, Action::UploadConfirmation)?;
    Ok::<_, LifecycleError>(StepControl::Continue)
  });

  flow.on("submit_confirmation_image", |ctx: FlowContext<UploadCtxData>| async move {
    let (uploader, order_id, image) = {
      let mut guard = ctx.write();
      (guard.services.uploader.clone(), guard.order.id, guard.image.take())
    };
    let Some(image) = image else {
      return Err(LifecycleError::precondition(
        order_id,
        Action::UploadConfirmation,
        ctx.read().order.status,
        "no image attached",
      ));
    };
    info!(order_id, file = %image.file_name, bytes = image.bytes.len(), "Uploading delivery confirmation.");
    if let Err(source) = uploader.upload_confirmation(order_id, image).await {
      warn!(order_id, error = %source, "Delivery confirmation upload failed.");
      return Err(LifecycleError::UploadFailed { order_id, source });
    }
    ctx.write().uploaded = true;
    Ok::<_, LifecycleError>(StepControl::Continue)
  });

  flow
}

pub fn register_upload_flow(registry: &FlowRegistry<LifecycleError>) {
  registry.register(upload_flow());
}
