// lensflow/src/flow/hooks.rs

//! Registration of `before` / `on` / `after` handlers.

use super::control::{Phase, StepControl};
use super::definition::{Flow, Handler};
use super::FlowContext;
use crate::error::FlowError;
use std::future::Future;
use tracing::{event, Level};

impl<T, E> Flow<T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Attaches `handler` to `phase` of `step_name`. The handler may fail with any
  /// error convertible into the flow's `E`.
  pub fn attach<F, HandlerErr>(
    &mut self,
    step_name: &str,
    phase: Phase,
    handler: impl Fn(FlowContext<T>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<E> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let boxed: Handler<T, E> = Box::new(move |ctx| {
      let fut = handler(ctx);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    self
      .handlers
      .entry((step_name.to_string(), phase))
      .or_default()
      .push(boxed);
    event!(Level::TRACE, flow = %self.name, step = step_name, phase = phase.as_str(), "Handler attached.");
  }

  pub fn before<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler: impl Fn(FlowContext<T>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<E> + Send + Sync + 'static,
  {
    self.attach(step_name, Phase::Before, handler);
  }

  pub fn on<F, HandlerErr>(&mut self, step_name: &str, handler: impl Fn(FlowContext<T>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<E> + Send + Sync + 'static,
  {
    self.attach(step_name, Phase::On, handler);
  }

  pub fn after<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler: impl Fn(FlowContext<T>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<E> + Send + Sync + 'static,
  {
    self.attach(step_name, Phase::After, handler);
  }
}
