// lensflow/src/flow/registry.rs

//! `FlowRegistry<E>`: flows keyed by the type of the context data they run on.
//!
//! The lifecycle controller and the payment-return correlator each build one at
//! construction and dispatch every operation through it, so a host can swap or
//! extend a flow (e.g. add an audit step) before handing the registry over.

use super::control::FlowOutcome;
use super::definition::Flow;
use super::FlowContext;
use crate::error::FlowError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, Level};

#[async_trait]
trait ErasedFlow<E>: Send + Sync
where
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn name(&self) -> &str;

  /// `ctx` must box a `FlowContext<T>` for the flow's own `T`.
  async fn run_erased(&self, ctx: Box<dyn Any + Send>) -> Result<FlowOutcome, E>;
}

#[async_trait]
impl<T, E> ErasedFlow<E> for Flow<T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn name(&self) -> &str {
    Flow::name(self)
  }

  async fn run_erased(&self, ctx: Box<dyn Any + Send>) -> Result<FlowOutcome, E> {
    let ctx = ctx.downcast::<FlowContext<T>>().map_err(|_| {
      E::from(FlowError::TypeMismatch {
        flow: self.name.clone(),
        expected_type: std::any::type_name::<FlowContext<T>>().to_string(),
      })
    })?;
    self.run(*ctx).await
  }
}

pub struct FlowRegistry<E>
where
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  flows: RwLock<HashMap<TypeId, Arc<dyn ErasedFlow<E>>>>,
}

impl<E> FlowRegistry<E>
where
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      flows: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `flow` for context data `T`, replacing any flow registered for
  /// the same `T` before.
  pub fn register<T>(&self, flow: Flow<T, E>)
  where
    T: Send + Sync + 'static,
  {
    event!(Level::DEBUG, flow = %flow.name(), context_type = %std::any::type_name::<T>(), "Registering flow.");
    if let Some(previous) = self.flows.write().insert(TypeId::of::<T>(), Arc::new(flow)) {
      event!(Level::INFO, replaced = %previous.name(), "Flow replaced an earlier registration.");
    }
  }

  pub fn is_registered<T: Send + Sync + 'static>(&self) -> bool {
    self.flows.read().contains_key(&TypeId::of::<T>())
  }

  /// Runs the flow registered for `T`.
  pub async fn run<T>(&self, ctx: FlowContext<T>) -> Result<FlowOutcome, E>
  where
    T: Send + Sync + 'static,
  {
    let flow = self.flows.read().get(&TypeId::of::<T>()).cloned().ok_or_else(|| {
      let context_type = std::any::type_name::<T>();
      event!(Level::ERROR, context_type, "No flow registered for context type.");
      E::from(FlowError::NotRegistered {
        context_type: context_type.to_string(),
      })
    })?;
    flow.run_erased(Box::new(ctx)).await
  }
}

impl<E> Default for FlowRegistry<E>
where
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}
