// tests/common/mod.rs
#![allow(dead_code)] // Not every test file uses every fake.

use lensflow::{
  ConfirmationImage, ConfirmationUploader, DeliveryMode, Destination, FlowError, MemoryResumeStore, Money, Navigator,
  Notifier, NotifyKind, Order, OrderId, OrderService, OrderStatus, PaymentDetails, PaymentGateway, PaymentRecord,
  ResumeStore, ResumeToken, ServiceError, ServiceResult, Services,
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::Level;

// --- Flow engine test context and error ---

#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub should_halt_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("flow engine error: {0}")]
  Flow(String),

  #[error("test handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(e: FlowError) -> Self {
    TestError::Flow(e.to_string())
  }
}

pub fn record(ctx: &lensflow::FlowContext<TestContext>, step: &str, text: &str) -> lensflow::StepControl {
  let mut guard = ctx.write();
  guard.counter += 1;
  guard.message.push_str(text);
  guard.steps_executed.push(step.to_string());
  if guard.should_halt_at.as_deref() == Some(step) {
    lensflow::StepControl::Halt
  } else {
    lensflow::StepControl::Continue
  }
}

// --- Tracing, set up once per test binary ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Order fixtures ---

pub fn home_order(id: OrderId, status: OrderStatus, total: i64, paid: i64) -> Order {
  Order::new(
    id,
    format!("ORD-{}", id),
    status,
    DeliveryMode::HomeDelivery,
    None,
    Money(total),
    Money(paid),
  )
  .expect("valid home order")
}

pub fn kiosk_order(id: OrderId, status: OrderStatus, total: i64, paid: i64, is_deposit: bool) -> Order {
  Order::new(
    id,
    format!("ORD-{}", id),
    status,
    DeliveryMode::KioskPickup,
    Some(7),
    Money(total),
    Money(paid),
  )
  .expect("valid kiosk order")
  .with_deposit(is_deposit)
}

pub fn details_for(order: &Order) -> PaymentDetails {
  PaymentDetails {
    order_id: order.id,
    total_amount: order.total_amount,
    total_paid: order.total_paid,
    remaining_amount: order.remaining_amount,
    is_deposit: order.is_deposit,
    payments: vec![PaymentRecord {
      id: 1,
      amount: order.total_paid,
      method: "VNPAY".to_string(),
      status: "SUCCESS".to_string(),
      paid_at: Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap(),
    }],
  }
}

pub fn photo() -> ConfirmationImage {
  ConfirmationImage {
    file_name: "handoff.jpg".to_string(),
    content_type: "image/jpeg".to_string(),
    bytes: vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3],
  }
}

// --- Order service fake ---

/// In-memory backend. Every call is counted; failures are injected per
/// operation. `hold_updates` parks `update_status` until `release_updates`.
#[derive(Default)]
pub struct FakeOrderService {
  pub orders: Mutex<HashMap<OrderId, Order>>,
  pub fetch_calls: AtomicUsize,
  pub update_calls: AtomicUsize,
  pub delete_calls: AtomicUsize,
  pub fail_fetch: Mutex<Option<ServiceError>>,
  pub fail_update: Mutex<Option<ServiceError>>,
  pub fail_delete: Mutex<Option<ServiceError>>,
  hold_updates: AtomicBool,
  update_entered: Notify,
  update_release: Notify,
}

impl FakeOrderService {
  pub fn with_order(order: Order) -> Arc<Self> {
    let service = Self::default();
    service.orders.lock().insert(order.id, order);
    Arc::new(service)
  }

  pub fn stored(&self, order_id: OrderId) -> Option<Order> {
    self.orders.lock().get(&order_id).cloned()
  }

  pub fn put(&self, order: Order) {
    self.orders.lock().insert(order.id, order);
  }

  pub fn hold_updates(&self) {
    self.hold_updates.store(true, Ordering::SeqCst);
  }

  /// Resolves once a held `update_status` call has started.
  pub async fn update_started(&self) {
    self.update_entered.notified().await;
  }

  pub fn release_updates(&self) {
    self.hold_updates.store(false, Ordering::SeqCst);
    self.update_release.notify_one();
  }
}

#[async_trait]
impl OrderService for FakeOrderService {
  async fn fetch_order(&self, order_id: OrderId) -> ServiceResult<Order> {
    self.fetch_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(e) = self.fail_fetch.lock().clone() {
      return Err(e);
    }
    self
      .stored(order_id)
      .ok_or_else(|| ServiceError::NotFound(format!("order {}", order_id)))
  }

  async fn update_status(&self, order_id: OrderId, new_status: OrderStatus) -> ServiceResult<()> {
    self.update_calls.fetch_add(1, Ordering::SeqCst);
    if self.hold_updates.load(Ordering::SeqCst) {
      self.update_entered.notify_one();
      self.update_release.notified().await;
    }
    if let Some(e) = self.fail_update.lock().clone() {
      return Err(e);
    }
    let mut orders = self.orders.lock();
    let order = orders
      .get_mut(&order_id)
      .ok_or_else(|| ServiceError::NotFound(format!("order {}", order_id)))?;
    order.status = new_status;
    Ok(())
  }

  async fn delete_order(&self, order_id: OrderId) -> ServiceResult<()> {
    self.delete_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(e) = self.fail_delete.lock().clone() {
      return Err(e);
    }
    self
      .orders
      .lock()
      .remove(&order_id)
      .map(|_| ())
      .ok_or_else(|| ServiceError::NotFound(format!("order {}", order_id)))
  }
}

// --- Payment gateway fake ---

pub struct FakePaymentGateway {
  pub payment_url: Mutex<ServiceResult<String>>,
  pub details: Mutex<HashMap<OrderId, PaymentDetails>>,
  pub fail_details: Mutex<Option<ServiceError>>,
  pub url_calls: AtomicUsize,
  pub detail_calls: AtomicUsize,
  pub requested: Mutex<Vec<(OrderId, Money)>>,
}

impl Default for FakePaymentGateway {
  fn default() -> Self {
    Self {
      payment_url: Mutex::new(Ok(
        "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html?vnp_TxnRef=VSU482".to_string(),
      )),
      details: Mutex::new(HashMap::new()),
      fail_details: Mutex::new(None),
      url_calls: AtomicUsize::new(0),
      detail_calls: AtomicUsize::new(0),
      requested: Mutex::new(Vec::new()),
    }
  }
}

impl FakePaymentGateway {
  pub fn set_url(&self, url: ServiceResult<String>) {
    *self.payment_url.lock() = url;
  }

  pub fn put_details(&self, details: PaymentDetails) {
    self.details.lock().insert(details.order_id, details);
  }
}

#[async_trait]
impl PaymentGateway for FakePaymentGateway {
  async fn request_payment_url(&self, order_id: OrderId, amount: Money) -> ServiceResult<String> {
    self.url_calls.fetch_add(1, Ordering::SeqCst);
    self.requested.lock().push((order_id, amount));
    self.payment_url.lock().clone()
  }

  async fn fetch_payment_details(&self, order_id: OrderId) -> ServiceResult<PaymentDetails> {
    self.detail_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(e) = self.fail_details.lock().clone() {
      return Err(e);
    }
    self
      .details
      .lock()
      .get(&order_id)
      .cloned()
      .ok_or_else(|| ServiceError::NotFound(format!("payments of order {}", order_id)))
  }
}

// --- Uploader fake: stores an image URL on the backing order ---

pub struct FakeUploader {
  pub orders: Arc<FakeOrderService>,
  pub calls: AtomicUsize,
  pub fail: Mutex<Option<ServiceError>>,
  pub received: Mutex<Vec<ConfirmationImage>>,
}

#[async_trait]
impl ConfirmationUploader for FakeUploader {
  async fn upload_confirmation(&self, order_id: OrderId, image: ConfirmationImage) -> ServiceResult<()> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if let Some(e) = self.fail.lock().clone() {
      return Err(e);
    }
    let url = format!("https://cdn.example.com/confirmations/{}/{}", order_id, image.file_name);
    self.received.lock().push(image);
    let mut orders = self.orders.orders.lock();
    let order = orders
      .get_mut(&order_id)
      .ok_or_else(|| ServiceError::NotFound(format!("order {}", order_id)))?;
    order.delivery_confirmation_image_url = Some(url);
    Ok(())
  }
}

// --- Resume store that refuses writes ---

#[derive(Default)]
pub struct BrokenResumeStore;

impl ResumeStore for BrokenResumeStore {
  fn save(&self, _token: ResumeToken) -> ServiceResult<()> {
    Err(ServiceError::Storage("session storage is full".to_string()))
  }

  fn load_once(&self) -> ServiceResult<Option<ResumeToken>> {
    Err(ServiceError::Storage("session storage unavailable".to_string()))
  }
}

// --- Host surface recorders ---

#[derive(Default)]
pub struct RecordingNotifier {
  pub messages: Mutex<Vec<(NotifyKind, String)>>,
}

impl RecordingNotifier {
  pub fn kinds(&self) -> Vec<NotifyKind> {
    self.messages.lock().iter().map(|(kind, _)| *kind).collect()
  }

  pub fn count(&self) -> usize {
    self.messages.lock().len()
  }
}

impl Notifier for RecordingNotifier {
  fn notify(&self, kind: NotifyKind, message: &str) {
    self.messages.lock().push((kind, message.to_string()));
  }
}

#[derive(Default)]
pub struct RecordingNavigator {
  pub visits: Mutex<Vec<Destination>>,
}

impl RecordingNavigator {
  pub fn visits(&self) -> Vec<Destination> {
    self.visits.lock().clone()
  }
}

impl Navigator for RecordingNavigator {
  fn navigate(&self, destination: Destination) {
    self.visits.lock().push(destination);
  }
}

// --- Everything wired together ---

pub struct TestBackend {
  pub orders: Arc<FakeOrderService>,
  pub payments: Arc<FakePaymentGateway>,
  pub uploader: Arc<FakeUploader>,
  pub resume: Arc<MemoryResumeStore>,
  pub notifier: Arc<RecordingNotifier>,
  pub navigator: Arc<RecordingNavigator>,
}

impl TestBackend {
  pub fn with_order(order: Order) -> Self {
    let orders = FakeOrderService::with_order(order.clone());
    let payments = Arc::new(FakePaymentGateway::default());
    payments.put_details(details_for(&order));
    let uploader = Arc::new(FakeUploader {
      orders: orders.clone(),
      calls: AtomicUsize::new(0),
      fail: Mutex::new(None),
      received: Mutex::new(Vec::new()),
    });
    Self {
      orders,
      payments,
      uploader,
      resume: Arc::new(MemoryResumeStore::new()),
      notifier: Arc::new(RecordingNotifier::default()),
      navigator: Arc::new(RecordingNavigator::default()),
    }
  }

  pub fn services(&self) -> Services {
    Services {
      orders: self.orders.clone(),
      payments: self.payments.clone(),
      uploader: self.uploader.clone(),
      resume: self.resume.clone(),
      notifier: self.notifier.clone(),
      navigator: self.navigator.clone(),
    }
  }

  pub fn network_calls(&self) -> usize {
    self.orders.fetch_calls.load(Ordering::SeqCst)
      + self.orders.update_calls.load(Ordering::SeqCst)
      + self.orders.delete_calls.load(Ordering::SeqCst)
      + self.payments.url_calls.load(Ordering::SeqCst)
      + self.payments.detail_calls.load(Ordering::SeqCst)
      + self.uploader.calls.load(Ordering::SeqCst)
  }
}
