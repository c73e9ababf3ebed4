// lensflow/src/resume.rs

//! The resumable token written right before the browser leaves for the payment
//! gateway and read back once when it returns.

use crate::error::ServiceResult;
use crate::model::{Money, OrderId, OrderStatus};
use crate::ports::ResumeStore;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeToken {
  pub order_id: OrderId,
  /// Status the order had when the payment was started.
  pub status: OrderStatus,
  pub amount: Money,
  pub issued_at: DateTime<Utc>,
}

impl ResumeToken {
  pub fn issue(order_id: OrderId, status: OrderStatus, amount: Money) -> Self {
    Self {
      order_id,
      status,
      amount,
      issued_at: Utc::now(),
    }
  }

  pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
    now - self.issued_at > ttl
  }
}

/// In-process store, for hosts where the "navigation" does not tear down the
/// process, and for tests.
#[derive(Debug, Default)]
pub struct MemoryResumeStore {
  slot: Mutex<Option<ResumeToken>>,
}

impl MemoryResumeStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn peek(&self) -> Option<ResumeToken> {
    self.slot.lock().clone()
  }
}

impl ResumeStore for MemoryResumeStore {
  fn save(&self, token: ResumeToken) -> ServiceResult<()> {
    *self.slot.lock() = Some(token);
    Ok(())
  }

  fn load_once(&self) -> ServiceResult<Option<ResumeToken>> {
    Ok(self.slot.lock().take())
  }
}
