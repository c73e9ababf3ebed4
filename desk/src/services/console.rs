// lensflow-desk/src/services/console.rs

use lensflow::{Destination, Navigator, Notifier, NotifyKind};

/// Prints notifications for the operator on stderr; stdout stays for command
/// output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
  fn notify(&self, kind: NotifyKind, message: &str) {
    let tag = match kind {
      NotifyKind::Success => "ok",
      NotifyKind::Info => "info",
      NotifyKind::Warning => "warning",
      NotifyKind::Error => "error",
    };
    tracing::debug!(kind = tag, text = message, "Notification.");
    eprintln!("[{}] {}", tag, message);
  }
}

/// The desk has no browser. An external destination is printed for the
/// operator to open; internal ones name the next screen.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
  fn navigate(&self, destination: Destination) {
    match destination {
      Destination::External(url) => {
        println!("Open the payment page to continue:");
        println!("  {}", url);
        println!("When the gateway redirects back, run `lensflow-desk payment-return '<return url>'`.");
      }
      Destination::OrderList => println!("-> order list"),
      Destination::Receipt { order_id } => println!("-> receipt for order {}", order_id),
    }
  }
}
