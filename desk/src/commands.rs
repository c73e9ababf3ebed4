// lensflow-desk/src/commands.rs

//! Desk subcommands. Each one loads the order fresh, drives the lifecycle
//! controller (or the payment-return correlator) and prints the result.

use crate::errors::{AppError, Result};
use crate::state::AppState;
use clap::{Parser, Subcommand};
use lensflow::display::{present, timeline};
use lensflow::{
  Action, ConfirmationImage, LifecycleController, Order, OrderId, PaymentReturnCorrelator, PendingTransition,
  ReceiptView, Resolution, TransitionOutcome,
};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument};

#[derive(Debug, Parser)]
#[command(name = "lensflow-desk", version, about = "Order fulfillment desk for the eyewear shops")]
pub struct Cli {
  #[command(subcommand)]
  pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Show an order, its status timeline and what can be done next.
  Show { order_id: OrderId },
  /// Move an order to its next status.
  Advance {
    order_id: OrderId,
    /// Skip the confirmation prompt.
    #[arg(long)]
    yes: bool,
  },
  /// Cancel a pending order. The order record is deleted.
  Cancel {
    order_id: OrderId,
    #[arg(long)]
    yes: bool,
  },
  /// Start a payment for the outstanding balance and print the gateway URL.
  Pay {
    order_id: OrderId,
    #[arg(long)]
    yes: bool,
  },
  /// Upload the kiosk handoff photo for an order.
  Upload { order_id: OrderId, image: PathBuf },
  /// Resolve the gateway's return URL (or its query string) after a payment.
  PaymentReturn { return_url: String },
}

pub async fn dispatch(state: &AppState, command: Command) -> Result<()> {
  match command {
    Command::Show { order_id } => show(state, order_id).await,
    Command::Advance { order_id, yes } => confirmed(state, order_id, Action::Advance, yes).await,
    Command::Cancel { order_id, yes } => confirmed(state, order_id, Action::Cancel, yes).await,
    Command::Pay { order_id, yes } => confirmed(state, order_id, Action::Pay, yes).await,
    Command::Upload { order_id, image } => upload(state, order_id, &image).await,
    Command::PaymentReturn { return_url } => payment_return(state, &return_url).await,
  }
}

async fn load(state: &AppState, order_id: OrderId) -> Result<LifecycleController> {
  Ok(LifecycleController::load(order_id, state.config.role, state.services.clone()).await?)
}

#[instrument(skip(state))]
async fn show(state: &AppState, order_id: OrderId) -> Result<()> {
  let controller = load(state, order_id).await?;
  print_order(&controller.order());
  let actions: Vec<&str> = controller.available_actions().iter().map(|a| a.as_str()).collect();
  if actions.is_empty() {
    println!("No actions available for the {} role.", controller.role().as_str());
  } else {
    println!("Available: {}", actions.join(", "));
  }
  Ok(())
}

/// Advance, cancel and pay: propose, ask, then confirm.
#[instrument(skip(state))]
async fn confirmed(state: &AppState, order_id: OrderId, action: Action, yes: bool) -> Result<()> {
  let controller = load(state, order_id).await?;
  let proposal = controller.propose(action)?;
  if !yes && !ask(&describe(&proposal)).await? {
    controller.dismiss();
    return Err(AppError::Aborted);
  }
  let outcome = controller.confirm().await?;
  print_outcome(&outcome);
  Ok(())
}

#[instrument(skip(state))]
async fn upload(state: &AppState, order_id: OrderId, path: &Path) -> Result<()> {
  let image = read_image(path).await?;
  let controller = load(state, order_id).await?;
  let outcome = controller.request_upload_confirmation(order_id, image).await?;
  print_outcome(&outcome);
  Ok(())
}

#[instrument(skip(state, return_url))]
async fn payment_return(state: &AppState, return_url: &str) -> Result<()> {
  let correlator = PaymentReturnCorrelator::new(state.services.clone(), state.settings.clone());
  match correlator.resolve(return_url).await? {
    Resolution::Receipt(receipt) => print_receipt(&receipt),
    Resolution::AlreadyResolved => info!("Payment return was already resolved."),
  }
  Ok(())
}

async fn read_image(path: &Path) -> Result<ConfirmationImage> {
  let mime = mime_guess::from_path(path).first_or_octet_stream();
  if mime.type_() != mime_guess::mime::IMAGE {
    return Err(AppError::Validation(format!(
      "{} does not look like an image ({})",
      path.display(),
      mime
    )));
  }
  let bytes = tokio::fs::read(path).await?;
  if bytes.is_empty() {
    return Err(AppError::Validation(format!("{} is empty", path.display())));
  }
  let file_name = path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| "confirmation".to_string());
  Ok(ConfirmationImage {
    file_name,
    content_type: mime.essence_str().to_string(),
    bytes,
  })
}

async fn ask(question: &str) -> Result<bool> {
  println!("{} [y/N]", question);
  let mut line = String::new();
  BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
  Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn describe(proposal: &PendingTransition) -> String {
  match (proposal.action, proposal.amount) {
    (Action::Pay, Some(amount)) => format!("Charge {} VND for order {}?", amount, proposal.order_id),
    (Action::Cancel, _) => format!("Cancel order {}? This deletes the order.", proposal.order_id),
    _ => format!(
      "Move order {} from {} to {}?",
      proposal.order_id,
      proposal.from_status.as_str(),
      proposal.target_status.as_str()
    ),
  }
}

fn print_order(order: &Order) {
  let presentation = present(order.status);
  println!("Order {} ({})", order.code, order.id);
  println!("  Status:    {} [{}]", presentation.label, order.status);
  if let Some(eta) = presentation.estimated_duration {
    println!("  Next step: {}", eta);
  }
  println!(
    "  Amounts:   total {} / paid {} / remaining {}{}",
    order.total_amount,
    order.total_paid,
    order.remaining_amount,
    if order.is_deposit { " (deposit)" } else { "" }
  );
  match order.kiosk_id {
    Some(kiosk) => println!("  Delivery:  kiosk pickup at kiosk {}", kiosk),
    None => println!("  Delivery:  home delivery"),
  }
  if let Some(url) = &order.delivery_confirmation_image_url {
    println!("  Photo:     {}", url);
  }
  for (status, row, reached) in timeline(order.status) {
    println!("    [{}] {} ({})", if reached { "x" } else { " " }, row.label, status.as_str());
  }
}

fn print_outcome(outcome: &TransitionOutcome) {
  match outcome {
    TransitionOutcome::StatusChanged { order_id, from, to } => {
      println!("Order {}: {} -> {}", order_id, from.as_str(), to.as_str())
    }
    TransitionOutcome::Cancelled { order_id } => println!("Order {} cancelled.", order_id),
    TransitionOutcome::RedirectIssued { order_id, amount, .. } => {
      println!("Payment of {} VND started for order {}.", amount, order_id)
    }
    TransitionOutcome::ConfirmationUploaded { order_id, image_url } => match image_url {
      Some(url) => println!("Confirmation for order {} stored at {}.", order_id, url),
      None => println!("Confirmation for order {} uploaded.", order_id),
    },
  }
}

fn print_receipt(receipt: &ReceiptView) {
  println!("Receipt for order {} ({})", receipt.order_code, receipt.order_id);
  for line in &receipt.items {
    println!(
      "  {} x{} @ {}{}",
      line.product_name,
      line.quantity,
      line.unit_price,
      line.lens_name.as_deref().map(|l| format!(" + {}", l)).unwrap_or_default()
    );
  }
  println!("  Total:     {}", receipt.total_amount);
  println!("  Paid:      {}", receipt.total_paid);
  println!("  Remaining: {}", receipt.remaining_amount);
  for payment in &receipt.payments {
    println!(
      "    {} {} {} ({})",
      payment.paid_at.format("%Y-%m-%d %H:%M"),
      payment.method,
      payment.amount,
      payment.status
    );
  }
}
