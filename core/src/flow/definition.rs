// lensflow/src/flow/definition.rs

//! The `Flow<T, E>` definition and the edits allowed on its step list before
//! it is registered.

use super::control::{Phase, StepControl};
use super::step::{SkipIf, StepDef};
use super::FlowContext;
use crate::error::FlowError;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Boxed async step handler.
///
/// Receives a clone of the flow's [`FlowContext`]. Lock guards taken on it must
/// be released before the handler awaits anything.
pub type Handler<T, E> =
  Box<dyn Fn(FlowContext<T>) -> Pin<Box<dyn Future<Output = Result<StepControl, E>> + Send>> + Send + Sync>;

/// An ordered list of named steps over context data `T`, whose handlers fail
/// with `E`.
///
/// `E` must absorb [`FlowError`] so that engine-level problems (a required
/// step without handlers, say) come out of [`Flow::run`] as the caller's own
/// error type.
pub struct Flow<T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) name: String,
  pub(crate) steps: Vec<StepDef<T>>,
  pub(crate) handlers: HashMap<(String, Phase), Vec<Handler<T, E>>>,
}

impl<T, E> Flow<T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new(name: impl Into<String>, steps: Vec<StepDef<T>>) -> Self {
    let flow = Self {
      name: name.into(),
      steps: Vec::with_capacity(steps.len()),
      handlers: HashMap::new(),
    };
    steps.into_iter().fold(flow, |mut flow, step| {
      flow.ensure_step_absent(&step.name);
      flow.steps.push(step);
      flow
    })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub(crate) fn position(&self, step_name: &str) -> Option<usize> {
    self.steps.iter().position(|s| s.name == step_name)
  }

  /// Panics on an unknown step name. Misspelled step names are wiring bugs,
  /// not runtime conditions.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) -> usize {
    self.position(step_name).unwrap_or_else(|| {
      panic!("flow '{}': step '{}' is not defined", self.name, step_name)
    })
  }

  fn ensure_step_absent(&self, step_name: &str) {
    if self.position(step_name).is_some() {
      panic!("flow '{}': step '{}' is already defined", self.name, step_name);
    }
  }

  pub fn insert_before(&mut self, existing: &str, step: StepDef<T>) {
    let idx = self.ensure_step_exists(existing);
    self.ensure_step_absent(&step.name);
    self.steps.insert(idx, step);
  }

  pub fn insert_after(&mut self, existing: &str, step: StepDef<T>) {
    let idx = self.ensure_step_exists(existing);
    self.ensure_step_absent(&step.name);
    self.steps.insert(idx + 1, step);
  }

  /// Removes the step and every handler attached to it. Unknown names are a no-op.
  pub fn remove_step(&mut self, step_name: &str) {
    if let Some(idx) = self.position(step_name) {
      self.steps.remove(idx);
      self.handlers.retain(|(name, _), _| name != step_name);
    }
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) {
    let idx = self.ensure_step_exists(step_name);
    self.steps[idx].optional = optional;
  }

  pub fn set_skip_if(&mut self, step_name: &str, skip_if: Option<SkipIf<T>>) {
    let idx = self.ensure_step_exists(step_name);
    self.steps[idx].skip_if = skip_if;
  }

  pub(crate) fn handlers_for(&self, step_name: &str, phase: Phase) -> &[Handler<T, E>] {
    self
      .handlers
      .get(&(step_name.to_string(), phase))
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  pub(crate) fn has_any_handler(&self, step_name: &str) -> bool {
    Phase::ALL.iter().any(|phase| !self.handlers_for(step_name, *phase).is_empty())
  }
}
