// lensflow/src/model/action.rs

use super::{Money, OrderId, OrderStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Something the user may do to an order from its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
  /// Move to `status.next()`.
  Advance,
  Cancel,
  Pay,
  UploadConfirmation,
}

impl Action {
  pub fn as_str(&self) -> &'static str {
    match self {
      Action::Advance => "advance",
      Action::Cancel => "cancel",
      Action::Pay => "pay",
      Action::UploadConfirmation => "upload confirmation",
    }
  }

  /// Destructive and payment-triggering actions go through a
  /// [`PendingTransition`] before they run.
  pub fn requires_confirmation(&self) -> bool {
    !matches!(self, Action::UploadConfirmation)
  }
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Set of actions with a deterministic iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ActionSet(BTreeSet<Action>);

impl ActionSet {
  pub fn empty() -> Self {
    Self(BTreeSet::new())
  }

  pub fn insert(&mut self, action: Action) {
    self.0.insert(action);
  }

  pub fn contains(&self, action: Action) -> bool {
    self.0.contains(&action)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
    self.0.iter().copied()
  }

  pub fn retain(&mut self, keep: impl FnMut(&Action) -> bool) {
    self.0.retain(keep);
  }
}

impl FromIterator<Action> for ActionSet {
  fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

impl<const N: usize> From<[Action; N]> for ActionSet {
  fn from(actions: [Action; N]) -> Self {
    actions.into_iter().collect()
  }
}

/// Transient dialog state: the action the user picked and is being asked to
/// confirm. Cleared on confirm or dismiss; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransition {
  pub order_id: OrderId,
  pub action: Action,
  pub from_status: OrderStatus,
  pub target_status: OrderStatus,
  /// Amount that will be charged, for `Pay` only.
  pub amount: Option<Money>,
  pub requires_confirmation: bool,
}
