// lensflow/src/display.rs

//! Presentation data per order status. Display only; no rule about what may
//! happen next lives here.

use crate::model::OrderStatus;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPresentation {
  pub label: &'static str,
  pub icon_class: &'static str,
  /// Hex colour for badges and timeline dots.
  pub color: &'static str,
  pub estimated_duration: Option<&'static str>,
  /// Rendered as a terminal banner with the action surface hidden.
  pub terminal: bool,
}

pub fn present(status: OrderStatus) -> StatusPresentation {
  match status {
    OrderStatus::Pending => StatusPresentation {
      label: "Awaiting confirmation",
      icon_class: "icon-clock",
      color: "#f59e0b",
      estimated_duration: Some("within 1 day"),
      terminal: false,
    },
    OrderStatus::Processing => StatusPresentation {
      label: "Grinding lenses",
      icon_class: "icon-settings",
      color: "#3b82f6",
      estimated_duration: Some("2-3 days"),
      terminal: false,
    },
    OrderStatus::Shipping => StatusPresentation {
      label: "On the way",
      icon_class: "icon-truck",
      color: "#8b5cf6",
      estimated_duration: Some("1-2 days"),
      terminal: false,
    },
    OrderStatus::Delivered => StatusPresentation {
      label: "Delivered",
      icon_class: "icon-package-check",
      color: "#10b981",
      estimated_duration: Some("awaiting customer sign-off"),
      terminal: false,
    },
    OrderStatus::Completed => StatusPresentation {
      label: "Completed",
      icon_class: "icon-badge-check",
      color: "#059669",
      estimated_duration: None,
      terminal: true,
    },
    OrderStatus::Cancelled => StatusPresentation {
      label: "Cancelled",
      icon_class: "icon-x-circle",
      color: "#ef4444",
      estimated_duration: None,
      terminal: true,
    },
  }
}

/// Timeline rows for a status: every fulfillment stage with whether it has been
/// reached. A cancelled order has no timeline, only its terminal banner.
pub fn timeline(current: OrderStatus) -> Vec<(OrderStatus, StatusPresentation, bool)> {
  if current == OrderStatus::Cancelled {
    return Vec::new();
  }
  OrderStatus::ALL
    .into_iter()
    .filter(|s| *s != OrderStatus::Cancelled)
    .map(|s| (s, present(s), s <= current))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_status_has_a_presentation() {
    for status in OrderStatus::ALL {
      let p = present(status);
      assert!(!p.label.is_empty());
      assert!(p.color.starts_with('#'));
      assert_eq!(p.terminal, status.is_terminal());
    }
  }

  #[test]
  fn timeline_marks_reached_stages() {
    let rows = timeline(OrderStatus::Shipping);
    assert_eq!(rows.len(), 5);
    let reached: Vec<bool> = rows.iter().map(|(_, _, reached)| *reached).collect();
    assert_eq!(reached, vec![true, true, true, false, false]);
    assert!(timeline(OrderStatus::Cancelled).is_empty());
  }
}
