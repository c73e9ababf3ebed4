// lensflow-desk/src/services/api_client.rs

//! Thin JSON/multipart client over the retail backend. Every failure comes back
//! as a [`ServiceError`]; deciding what the user sees is left to the lifecycle
//! core.

use crate::config::AppConfig;
use crate::errors::Result as AppResult;
use lensflow::{ServiceError, ServiceResult};
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ApiClient {
  client: Client,
  base_url: String,
  token: Option<String>,
}

impl ApiClient {
  pub fn new(config: &AppConfig) -> AppResult<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.http_timeout_secs))
      .build()?;
    Ok(Self {
      client,
      base_url: config.api_base_url.trim_end_matches('/').to_string(),
      token: config.api_token.clone(),
    })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/{}", self.base_url, path.trim_start_matches('/'))
  }

  fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
    match &self.token {
      Some(token) => request.bearer_auth(token),
      None => request,
    }
  }

  pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ServiceResult<T> {
    let response = self.send(self.client.get(self.url(path))).await?;
    decode(response).await
  }

  pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ServiceResult<()> {
    self.send(self.client.put(self.url(path)).json(body)).await.map(|_| ())
  }

  pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ServiceResult<T> {
    let response = self.send(self.client.post(self.url(path)).json(body)).await?;
    decode(response).await
  }

  pub async fn delete(&self, path: &str) -> ServiceResult<()> {
    self.send(self.client.delete(self.url(path))).await.map(|_| ())
  }

  pub async fn post_multipart(&self, path: &str, form: Form) -> ServiceResult<()> {
    self.send(self.client.post(self.url(path)).multipart(form)).await.map(|_| ())
  }

  /// Sends the request and turns any non-2xx answer into an error.
  async fn send(&self, request: RequestBuilder) -> ServiceResult<Response> {
    let response = self.authorize(request).send().await.map_err(transport_error)?;
    let status = response.status();
    debug!(url = %response.url(), status = status.as_u16(), "Backend responded.");
    if status.is_success() {
      return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let error = status_error(status, &body);
    warn!(status = status.as_u16(), error = %error, "Backend refused the request.");
    Err(error)
  }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ServiceResult<T> {
  let bytes = response.bytes().await.map_err(transport_error)?;
  serde_json::from_slice(&bytes).map_err(|e| ServiceError::Decode(e.to_string()))
}

fn transport_error(e: reqwest::Error) -> ServiceError {
  if e.is_timeout() {
    ServiceError::Transport(format!("request timed out: {}", e))
  } else if e.is_decode() {
    ServiceError::Decode(e.to_string())
  } else {
    ServiceError::Transport(e.to_string())
  }
}

/// Maps an error status to a [`ServiceError`], preferring the backend's own
/// `message` / `error` field over the raw body.
pub(crate) fn status_error(status: StatusCode, body: &str) -> ServiceError {
  let message = serde_json::from_str::<serde_json::Value>(body)
    .ok()
    .and_then(|value| {
      ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|m| m.as_str()).map(str::to_string))
    })
    .unwrap_or_else(|| body.trim().to_string());
  let message = if message.is_empty() {
    status.canonical_reason().unwrap_or("no reason given").to_string()
  } else {
    message
  };
  match status {
    StatusCode::NOT_FOUND => ServiceError::NotFound(message),
    _ => ServiceError::Rejected {
      status: status.as_u16(),
      message,
    },
  }
}
