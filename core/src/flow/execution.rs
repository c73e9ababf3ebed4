// lensflow/src/flow/execution.rs

//! `Flow::run`: walks the steps in order and drives each phase's handlers.

use super::control::{FlowOutcome, Phase, StepControl};
use super::definition::Flow;
use super::FlowContext;
use crate::error::FlowError;
use tracing::{event, instrument, Instrument, Level};

impl<T, E> Flow<T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step against `ctx`.
  ///
  /// The first handler error aborts the run and is returned as is. Steps after
  /// it never execute, so whatever they would have written to `ctx` is absent.
  #[instrument(
    name = "Flow::run",
    skip_all,
    fields(flow = %self.name, num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx: FlowContext<T>) -> Result<FlowOutcome, E> {
    event!(Level::DEBUG, "Flow starting.");

    for (step_idx, step) in self.steps.iter().enumerate() {
      let step_name = step.name.as_str();

      if let Some(skip_if) = &step.skip_if {
        if skip_if(&ctx) {
          event!(Level::DEBUG, step = step_name, "Step skipped by its skip_if predicate.");
          continue;
        }
      }

      if !self.has_any_handler(step_name) {
        if step.optional {
          event!(Level::DEBUG, step = step_name, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(Level::ERROR, step = step_name, "Required step has no handlers.");
        return Err(E::from(FlowError::HandlerMissing {
          flow: self.name.clone(),
          step_name: step.name.clone(),
        }));
      }

      for phase in Phase::ALL {
        for (handler_idx, handler) in self.handlers_for(step_name, phase).iter().enumerate() {
          let span = tracing::debug_span!(
            "flow_step",
            step = step_name,
            step_index = step_idx,
            phase = phase.as_str(),
            handler_index = handler_idx
          );
          match handler(ctx.clone()).instrument(span).await {
            Ok(StepControl::Continue) => {}
            Ok(StepControl::Halt) => {
              event!(Level::INFO, step = step_name, phase = phase.as_str(), "Flow halted by handler.");
              return Ok(FlowOutcome::Halted);
            }
            Err(e) => {
              event!(Level::WARN, step = step_name, phase = phase.as_str(), error = %e, "Handler failed.");
              return Err(e);
            }
          }
        }
      }
      event!(Level::TRACE, step = step_name, "Step finished.");
    }

    event!(Level::DEBUG, "Flow completed.");
    Ok(FlowOutcome::Completed)
  }
}
