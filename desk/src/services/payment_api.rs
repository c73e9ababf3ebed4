// lensflow-desk/src/services/payment_api.rs

use super::api_client::ApiClient;
use async_trait::async_trait;
use lensflow::{Money, OrderId, PaymentDetails, PaymentGateway, ServiceResult};
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentUrlRequest {
  order_id: OrderId,
  amount: Money,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentUrlResponse {
  #[serde(default)]
  payment_url: String,
}

#[derive(Debug, Clone)]
pub struct RestPaymentGateway {
  api: ApiClient,
}

impl RestPaymentGateway {
  pub fn new(api: ApiClient) -> Self {
    Self { api }
  }
}

#[async_trait]
impl PaymentGateway for RestPaymentGateway {
  /// An empty `paymentUrl` is passed through; the controller decides it is
  /// unusable.
  #[instrument(name = "RestPaymentGateway::request_payment_url", skip(self))]
  async fn request_payment_url(&self, order_id: OrderId, amount: Money) -> ServiceResult<String> {
    let response: PaymentUrlResponse = self.api.post("payments/url", &PaymentUrlRequest { order_id, amount }).await?;
    Ok(response.payment_url)
  }

  #[instrument(name = "RestPaymentGateway::fetch_payment_details", skip(self))]
  async fn fetch_payment_details(&self, order_id: OrderId) -> ServiceResult<PaymentDetails> {
    self.api.get(&format!("payments/orders/{}", order_id)).await
  }
}
