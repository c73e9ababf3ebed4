// tests/correlator_tests.rs
mod common;

use common::*;
use chrono::{Duration, Utc};
use lensflow::{
  Destination, ErrorKind, LifecycleSettings, Money, NotifyKind, OrderStatus, PaymentReturnCorrelator, Resolution,
  ResumeStore, ResumeToken, ServiceError,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;

const SUCCESS_RETURN: &str = "https://desk.example.com/payment-return?vnp_Amount=99900000&vnp_ResponseCode=00&vnp_TransactionStatus=00&vnp_TxnRef=VSU482&vnp_OrderInfo=Thanh+toan";

fn paid_kiosk_backend() -> TestBackend {
  // What the backend reports once the gateway has settled the balance.
  let order = kiosk_order(482, OrderStatus::Shipping, 500_000, 500_000, true);
  TestBackend::with_order(order)
}

fn correlator(backend: &TestBackend) -> PaymentReturnCorrelator {
  PaymentReturnCorrelator::new(backend.services(), LifecycleSettings::default())
}

#[tokio::test]
async fn test_successful_return_builds_receipt_from_fetched_data() {
  setup_tracing();
  let backend = paid_kiosk_backend();
  backend
    .resume
    .save(ResumeToken::issue(482, OrderStatus::Shipping, Money(200_000)))
    .unwrap();

  let resolution = correlator(&backend).resolve(SUCCESS_RETURN).await.unwrap();

  let receipt = match resolution {
    Resolution::Receipt(receipt) => receipt,
    other => panic!("expected a receipt, got {:?}", other),
  };
  let details = backend.payments.details.lock().get(&482).cloned().unwrap();
  assert_eq!(receipt.order_id, 482);
  assert_eq!(receipt.total_amount, details.total_amount);
  assert_eq!(receipt.total_paid, details.total_paid);
  assert_eq!(receipt.total_paid, Money(500_000));
  assert_ne!(receipt.total_paid, Money(999_000_000));
  assert!(receipt.is_settled());
  assert_eq!(receipt.pre_payment_status, Some(OrderStatus::Shipping));
  assert_eq!(receipt.payments, details.payments);

  assert_eq!(backend.orders.fetch_calls.load(Ordering::SeqCst), 1);
  assert_eq!(backend.payments.detail_calls.load(Ordering::SeqCst), 1);
  assert_eq!(backend.navigator.visits(), vec![Destination::Receipt { order_id: 482 }]);
  assert_eq!(backend.notifier.kinds(), vec![NotifyKind::Success]);
  assert!(backend.resume.peek().is_none());
}

#[tokio::test]
async fn test_unsuccessful_codes_go_back_to_the_list_without_fetching() {
  setup_tracing();
  let backend = paid_kiosk_backend();
  backend
    .resume
    .save(ResumeToken::issue(482, OrderStatus::Shipping, Money(200_000)))
    .unwrap();

  let err = correlator(&backend)
    .resolve("vnp_ResponseCode=24&vnp_TransactionStatus=02&vnp_TxnRef=VSU482")
    .await
    .unwrap_err();

  assert_eq!(err.kind(), ErrorKind::CorrelationFailed);
  assert_eq!(backend.network_calls(), 0);
  assert_eq!(backend.navigator.visits(), vec![Destination::OrderList]);
  assert_eq!(backend.notifier.kinds(), vec![NotifyKind::Error]);
  // Consumed even though the payment failed.
  assert!(backend.resume.peek().is_none());
}

#[tokio::test]
async fn test_malformed_parameters_fail_correlation() {
  setup_tracing();
  for input in [
    "",
    "vnp_ResponseCode=00&vnp_TransactionStatus=00",
    "vnp_ResponseCode=00&vnp_TransactionStatus=00&vnp_TxnRef=482",
    "https://desk.example.com/payment-return",
  ] {
    let backend = paid_kiosk_backend();
    let err = correlator(&backend).resolve(input).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorrelationFailed, "input {:?}", input);
    assert_eq!(backend.network_calls(), 0);
    assert_eq!(backend.navigator.visits(), vec![Destination::OrderList]);
  }
}

#[tokio::test]
async fn test_fetch_failure_never_shows_a_receipt() {
  setup_tracing();
  let backend = paid_kiosk_backend();
  *backend.payments.fail_details.lock() = Some(ServiceError::Transport("timed out".to_string()));

  let err = correlator(&backend).resolve(SUCCESS_RETURN).await.unwrap_err();

  assert_eq!(err.kind(), ErrorKind::CorrelationFailed);
  assert_eq!(backend.navigator.visits(), vec![Destination::OrderList]);
  assert_eq!(backend.notifier.kinds(), vec![NotifyKind::Error]);
}

#[tokio::test]
async fn test_resolution_happens_at_most_once() {
  setup_tracing();
  let backend = paid_kiosk_backend();
  let correlator = Arc::new(correlator(&backend));

  let (first, second) = tokio::join!(correlator.resolve(SUCCESS_RETURN), correlator.resolve(SUCCESS_RETURN));
  let third = correlator.resolve(SUCCESS_RETURN).await.unwrap();

  let resolutions = [first.unwrap(), second.unwrap()];
  assert_eq!(
    resolutions.iter().filter(|r| matches!(r, Resolution::Receipt(_))).count(),
    1
  );
  assert_eq!(third, Resolution::AlreadyResolved);
  assert!(correlator.is_resolved());
  assert_eq!(backend.orders.fetch_calls.load(Ordering::SeqCst), 1);
  assert_eq!(backend.navigator.visits().len(), 1);
}

#[tokio::test]
async fn test_stale_or_foreign_tokens_are_not_used() {
  setup_tracing();
  let backend = paid_kiosk_backend();
  let mut expired = ResumeToken::issue(482, OrderStatus::Pending, Money(500_000));
  expired.issued_at = Utc::now() - Duration::hours(2);
  backend.resume.save(expired).unwrap();

  let Resolution::Receipt(receipt) = correlator(&backend).resolve(SUCCESS_RETURN).await.unwrap() else {
    panic!("expected a receipt");
  };
  assert_eq!(receipt.pre_payment_status, None);

  let backend = paid_kiosk_backend();
  backend
    .resume
    .save(ResumeToken::issue(17, OrderStatus::Pending, Money(90_000)))
    .unwrap();
  let Resolution::Receipt(receipt) = correlator(&backend).resolve(SUCCESS_RETURN).await.unwrap() else {
    panic!("expected a receipt");
  };
  assert_eq!(receipt.order_id, 482);
  assert_eq!(receipt.pre_payment_status, None);
  assert!(backend.resume.peek().is_none());
}

#[tokio::test]
async fn test_resolves_without_any_resume_token() {
  setup_tracing();
  let backend = paid_kiosk_backend();
  let Resolution::Receipt(receipt) = correlator(&backend).resolve(SUCCESS_RETURN).await.unwrap() else {
    panic!("expected a receipt");
  };
  assert_eq!(receipt.order_id, 482);
  assert_eq!(receipt.pre_payment_status, None);
}

#[tokio::test]
async fn test_payment_round_trip_from_controller_to_receipt() {
  setup_tracing();
  let backend = TestBackend::with_order(kiosk_order(482, OrderStatus::Shipping, 500_000, 300_000, true));
  let controller = lensflow::LifecycleController::new(
    backend.orders.stored(482).unwrap(),
    lensflow::Role::Shipper,
    backend.services(),
  );
  controller.propose(lensflow::Action::Pay).unwrap();
  controller.confirm().await.unwrap();

  // The gateway settles the balance while the browser is away.
  let settled = kiosk_order(482, OrderStatus::Shipping, 500_000, 500_000, true);
  backend.orders.put(settled.clone());
  backend.payments.put_details(details_for(&settled));

  let Resolution::Receipt(receipt) = correlator(&backend).resolve(SUCCESS_RETURN).await.unwrap() else {
    panic!("expected a receipt");
  };
  assert_eq!(receipt.pre_payment_status, Some(OrderStatus::Shipping));
  assert_eq!(receipt.remaining_amount, Money::ZERO);

  let reloaded = lensflow::LifecycleController::load(482, lensflow::Role::Shipper, backend.services())
    .await
    .unwrap();
  assert_eq!(
    reloaded.available_actions(),
    lensflow::ActionSet::from([lensflow::Action::UploadConfirmation])
  );
}
