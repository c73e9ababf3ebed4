// lensflow/src/correlator/resolve_flow.rs

use super::params::GatewayReturn;
use super::receipt::ReceiptView;
use crate::error::LifecycleError;
use crate::flow::{Flow, FlowContext, FlowRegistry, StepControl, StepDef};
use crate::model::{Order, PaymentDetails};
use crate::ports::Services;
use crate::resume::ResumeToken;
use crate::settings::LifecycleSettings;
use chrono::Utc;
use futures_util::future::try_join;
use tracing::{debug, info, warn};

pub const FLOW_NAME: &str = "resolve_payment_return";

#[derive(Clone)]
pub struct ResolveCtxData {
  pub services: Services,
  pub settings: LifecycleSettings,
  /// Return URL or query string exactly as the host received it.
  pub raw_return: String,
  pub token: Option<ResumeToken>,
  pub gateway: Option<GatewayReturn>,
  pub order: Option<Order>,
  pub payment: Option<PaymentDetails>,
  pub receipt: Option<ReceiptView>,
}

impl ResolveCtxData {
  pub fn new(services: Services, settings: LifecycleSettings, raw_return: impl Into<String>) -> Self {
    Self {
      services,
      settings,
      raw_return: raw_return.into(),
      token: None,
      gateway: None,
      order: None,
      payment: None,
      receipt: None,
    }
  }
}

pub fn resolve_flow() -> Flow<ResolveCtxData, LifecycleError> {
  let mut flow = Flow::new(
    FLOW_NAME,
    vec![
      StepDef::required("consume_resume_token"),
      StepDef::required("parse_gateway_return"),
      StepDef::required("verify_gateway_codes"),
      StepDef::required("discard_stale_token"),
      StepDef::required("fetch_authoritative_state"),
      StepDef::required("assemble_receipt"),
    ],
  );

  // Runs first so the token is gone whatever happens next.
  flow.on("consume_resume_token", |ctx: FlowContext<ResolveCtxData>| async move {
    let resume = ctx.read().services.resume.clone();
    match resume.load_once() {
      Ok(token) => {
        debug!(found = token.is_some(), "Resume token consumed.");
        ctx.write().token = token;
      }
      Err(e) => warn!(error = %e, "Resume store unreadable, continuing without a token."),
    }
    Ok::<_, LifecycleError>(StepControl::Continue)
  });

  flow.on("parse_gateway_return", |ctx: FlowContext<ResolveCtxData>| async move {
    let parsed = {
      let guard = ctx.read();
      GatewayReturn::parse(&guard.raw_return, &guard.settings.gateway)
    };
    let gateway = parsed.map_err(LifecycleError::correlation)?;
    debug!(order_id = gateway.order_id, order_ref = %gateway.order_ref, "Gateway return parsed.");
    ctx.write().gateway = Some(gateway);
    Ok::<_, LifecycleError>(StepControl::Continue)
  });

  flow.on("verify_gateway_codes", |ctx: FlowContext<ResolveCtxData>| async move {
    let guard = ctx.read();
    let gateway = guard
      .gateway
      .as_ref()
      .ok_or_else(|| LifecycleError::correlation("gateway parameters were not parsed"))?;
    if !gateway.is_success(&guard.settings.gateway) {
      warn!(
        order_id = gateway.order_id,
        response_code = %gateway.response_code,
        transaction_status = %gateway.transaction_status,
        "Gateway reported an unsuccessful payment."
      );
      return Err(LifecycleError::correlation(format!(
        "payment for order {} was not successful (response {}, transaction {})",
        gateway.order_id, gateway.response_code, gateway.transaction_status
      )));
    }
    Ok::<_, LifecycleError>(StepControl::Continue)
  });

  flow.on("discard_stale_token", |ctx: FlowContext<ResolveCtxData>| async move {
    let mut guard = ctx.write();
    let order_id = guard.gateway.as_ref().map(|g| g.order_id);
    let ttl = guard.settings.resume_ttl;
    let now = Utc::now();
    let stale = match &guard.token {
      Some(token) if Some(token.order_id) != order_id => {
        debug!(token_order = token.order_id, "Resume token names another order, ignoring it.");
        true
      }
      Some(token) if token.is_expired(ttl, now) => {
        debug!(issued_at = %token.issued_at, "Resume token expired, ignoring it.");
        true
      }
      _ => false,
    };
    if stale {
      guard.token = None;
    }
    Ok::<_, LifecycleError>(StepControl::Continue)
  });

  flow.on("fetch_authoritative_state", |ctx: FlowContext<ResolveCtxData>| async move {
    let (services, order_id) = {
      let guard = ctx.read();
      let order_id = guard
        .gateway
        .as_ref()
        .map(|g| g.order_id)
        .ok_or_else(|| LifecycleError::correlation("gateway parameters were not parsed"))?;
      (guard.services.clone(), order_id)
    };
    let (order, payment) = try_join(
      services.orders.fetch_order(order_id),
      services.payments.fetch_payment_details(order_id),
    )
    .await
    .map_err(|e| {
      warn!(order_id, error = %e, "Authoritative order state could not be fetched.");
      LifecycleError::correlation(format!("order {} could not be verified: {}", order_id, e))
    })?;
    let mut guard = ctx.write();
    guard.order = Some(order);
    guard.payment = Some(payment);
    Ok::<_, LifecycleError>(StepControl::Continue)
  });

  flow.on("assemble_receipt", |ctx: FlowContext<ResolveCtxData>| async move {
    let mut guard = ctx.write();
    let receipt = match (&guard.order, &guard.payment) {
      (Some(order), Some(payment)) => {
        ReceiptView::assemble(order, payment, guard.token.as_ref().map(|t| t.status)).map_err(LifecycleError::correlation)?
      }
      _ => return Err(LifecycleError::correlation("authoritative state missing")),
    };
    info!(order_id = receipt.order_id, total_paid = %receipt.total_paid, "Payment return resolved.");
    guard.receipt = Some(receipt);
    Ok::<_, LifecycleError>(StepControl::Continue)
  });

  flow
}

pub fn register_resolve_flow(registry: &FlowRegistry<LifecycleError>) {
  registry.register(resolve_flow());
}
