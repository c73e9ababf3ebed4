// lensflow/src/flow/mod.rs

//! A small async step-flow engine.
//!
//! A [`Flow`] is an ordered list of named steps over a shared [`FlowContext`].
//! Each step runs its `before`, `on` and `after` handlers in that order; any
//! handler can halt the flow or fail it. Every lifecycle operation in this
//! crate (advance, cancel, pay, upload, payment return) is one flow, which keeps
//! the order of side effects explicit and inspectable.

pub mod context;
pub mod control;
pub mod definition;
pub mod execution;
pub mod hooks;
pub mod registry;
pub mod step;

pub use context::FlowContext;
pub use control::{FlowOutcome, Phase, StepControl};
pub use definition::{Flow, Handler};
pub use registry::FlowRegistry;
pub use step::{SkipIf, StepDef};
