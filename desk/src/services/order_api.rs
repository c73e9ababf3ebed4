// lensflow-desk/src/services/order_api.rs

use super::api_client::ApiClient;
use async_trait::async_trait;
use lensflow::{ConfirmationImage, ConfirmationUploader, Order, OrderId, OrderService, OrderStatus, ServiceError, ServiceResult};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::instrument;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusUpdate {
  order_id: OrderId,
  new_status: OrderStatus,
}

#[derive(Debug, Clone)]
pub struct RestOrderService {
  api: ApiClient,
}

impl RestOrderService {
  pub fn new(api: ApiClient) -> Self {
    Self { api }
  }
}

#[async_trait]
impl OrderService for RestOrderService {
  #[instrument(name = "RestOrderService::fetch_order", skip(self))]
  async fn fetch_order(&self, order_id: OrderId) -> ServiceResult<Order> {
    self.api.get(&format!("orders/{}", order_id)).await
  }

  #[instrument(name = "RestOrderService::update_status", skip(self))]
  async fn update_status(&self, order_id: OrderId, new_status: OrderStatus) -> ServiceResult<()> {
    let body = StatusUpdate { order_id, new_status };
    self.api.put(&format!("orders/{}/status", order_id), &body).await
  }

  #[instrument(name = "RestOrderService::delete_order", skip(self))]
  async fn delete_order(&self, order_id: OrderId) -> ServiceResult<()> {
    self.api.delete(&format!("orders/{}", order_id)).await
  }
}

#[derive(Debug, Clone)]
pub struct RestConfirmationUploader {
  api: ApiClient,
}

impl RestConfirmationUploader {
  pub fn new(api: ApiClient) -> Self {
    Self { api }
  }
}

#[async_trait]
impl ConfirmationUploader for RestConfirmationUploader {
  #[instrument(name = "RestConfirmationUploader::upload_confirmation", skip(self, image), fields(file = %image.file_name))]
  async fn upload_confirmation(&self, order_id: OrderId, image: ConfirmationImage) -> ServiceResult<()> {
    let part = Part::bytes(image.bytes)
      .file_name(image.file_name)
      .mime_str(&image.content_type)
      .map_err(|e| ServiceError::Transport(format!("invalid content type: {}", e)))?;
    let form = Form::new().part("image", part);
    self
      .api
      .post_multipart(&format!("orders/{}/delivery-confirmation", order_id), form)
      .await
  }
}
