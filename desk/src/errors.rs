// lensflow-desk/src/errors.rs

use lensflow::{ErrorKind, LifecycleError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Invalid input: {0}")]
  Validation(String),

  #[error("I/O Error: {0}")]
  Io(#[from] std::io::Error),

  #[error("HTTP client error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{source}")]
  Lifecycle {
    #[from]
    source: LifecycleError,
  },

  #[error("Cancelled by the operator.")]
  Aborted,
}

impl AppError {
  /// Process exit code, so scripts can tell a refused action from a broken
  /// backend.
  pub fn exit_code(&self) -> i32 {
    match self {
      AppError::Config(_) | AppError::Validation(_) => 2,
      AppError::Aborted => 3,
      AppError::Lifecycle { source } => match source.kind() {
        ErrorKind::PreconditionFailed | ErrorKind::NothingPending | ErrorKind::Busy => 4,
        ErrorKind::CorrelationFailed => 5,
        _ => 1,
      },
      AppError::Io(_) | AppError::Http(_) => 1,
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
