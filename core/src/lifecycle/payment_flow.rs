// lensflow/src/lifecycle/payment_flow.rs

//! Payment hand-off: fetch a hosted payment page, persist what the return trip
//! needs, then leave. Nothing is written to the resume store unless a usable
//! URL came back, and nothing navigates unless the store accepted the token.

use super::contexts::PaymentCtxData;
use super::guards::ensure_allowed;
use crate::error::LifecycleError;
use crate::flow::{Flow, FlowContext, FlowRegistry, StepControl, StepDef};
use crate::model::{Action, PaymentContext};
use crate::ports::Destination;
use crate::resume::ResumeToken;
use tracing::{debug, info, warn};

pub const FLOW_NAME: &str = "pay_order";

pub fn payment_flow() -> Flow<PaymentCtxData, LifecycleError> {
  let mut flow = Flow::new(
    FLOW_NAME,
    vec![
      StepDef::required("verify_payment_allowed"),
      StepDef::required("request_payment_url"),
      StepDef::required("save_resume_token"),
      StepDef::required("redirect_to_gateway"),
    ],
  );

  flow.on("verify_payment_allowed", |ctx: FlowContext<PaymentCtxData>| async move {
    let mut guard = ctx.write();
    ensure_allowed(&guard.order, guard.role, Action::Pay)?;
    let payment = PaymentContext::for_order(&guard.order);
    if !payment.has_pending_payment {
      return Err(LifecycleError::precondition(
        guard.order.id,
        Action::Pay,
        guard.order.status,
        "nothing left to pay",
      ));
    }
    if guard.requested_amount != payment.amount {
      return Err(LifecycleError::precondition(
        guard.order.id,
        Action::Pay,
        guard.order.status,
        format!(
          "requested amount {} does not match the amount due {}",
          guard.requested_amount, payment.amount
        ),
      ));
    }
    guard.payment = Some(payment);
    Ok::<_, LifecycleError>(StepControl::Continue)
  });

  flow.on("request_payment_url", |ctx: FlowContext<PaymentCtxData>| async move {
    let (payments, order_id, amount) = {
      let guard = ctx.read();
      (guard.services.payments.clone(), guard.order.id, guard.requested_amount)
    };
    info!(order_id, amount = %amount, "Requesting hosted payment page.");
    let raw = payments.request_payment_url(order_id, amount).await.map_err(|source| {
      warn!(order_id, error = %source, "Payment url request failed.");
      LifecycleError::PaymentUrlUnavailable {
        order_id,
        reason: source.to_string(),
      }
    })?;
    let url = usable_gateway_url(&raw).ok_or_else(|| LifecycleError::PaymentUrlUnavailable {
      order_id,
      reason: format!("gateway returned an unusable url {:?}", raw),
    })?;
    ctx.write().payment_url = Some(url);
    Ok::<_, LifecycleError>(StepControl::Continue)
  });

  flow.on("save_resume_token", |ctx: FlowContext<PaymentCtxData>| async move {
    let (resume, token) = {
      let guard = ctx.read();
      (
        guard.services.resume.clone(),
        ResumeToken::issue(guard.order.id, guard.order.status, guard.requested_amount),
      )
    };
    let order_id = token.order_id;
    resume.save(token).map_err(|source| LifecycleError::PaymentUrlUnavailable {
      order_id,
      reason: format!("resume state could not be saved: {}", source),
    })?;
    ctx.write().token_saved = true;
    debug!(order_id, "Resume token saved.");
    Ok::<_, LifecycleError>(StepControl::Continue)
  });

  flow.on("redirect_to_gateway", |ctx: FlowContext<PaymentCtxData>| async move {
    let (navigator, url) = {
      let guard = ctx.read();
      (guard.services.navigator.clone(), guard.payment_url.clone())
    };
    match url {
      Some(url) => {
        navigator.navigate(Destination::External(url));
        ctx.write().redirected = true;
        Ok(StepControl::Continue)
      }
      None => Err(LifecycleError::PaymentUrlUnavailable {
        order_id: ctx.read().order.id,
        reason: "no url recorded before redirect".to_string(),
      }),
    }
  });

  flow
}

/// Accepts absolute `http`/`https` URLs only.
pub(crate) fn usable_gateway_url(raw: &str) -> Option<String> {
  let parsed = url::Url::parse(raw.trim()).ok()?;
  match parsed.scheme() {
    "http" | "https" if parsed.host_str().is_some() => Some(parsed.into()),
    _ => None,
  }
}

pub fn register_payment_flow(registry: &FlowRegistry<LifecycleError>) {
  registry.register(payment_flow());
}

#[cfg(test)]
mod tests {
  use super::usable_gateway_url;

  #[test]
  fn only_absolute_web_urls_are_usable() {
    assert!(usable_gateway_url("https://sandbox.vnpayment.vn/paymentv2/vpcpay.html?vnp_TxnRef=VSU1").is_some());
    assert!(usable_gateway_url("  http://pay.example.com/x ").is_some());
    assert!(usable_gateway_url("").is_none());
    assert!(usable_gateway_url("/relative/path").is_none());
    assert!(usable_gateway_url("javascript:alert(1)").is_none());
  }
}
