// lensflow-desk/src/config.rs

use crate::errors::{AppError, Result};
use chrono::TimeDelta;
use dotenvy::dotenv;
use lensflow::{GatewayReturnRules, LifecycleSettings, Role};
use std::env;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub api_base_url: String,
  pub api_token: Option<String>,
  /// Transport-level timeout. A hung backend call must not keep the action
  /// surface disabled forever.
  pub http_timeout_secs: u64,
  pub order_ref_prefix: String,
  pub session_dir: PathBuf,
  /// How long a saved payment resume token stays usable. Always positive.
  pub resume_ttl: TimeDelta,
  pub role: Role,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let api_base_url = parse_base_url(&get_env("LENSFLOW_API_BASE_URL")?)?;
    let api_token = get_env("LENSFLOW_API_TOKEN").ok().filter(|t| !t.trim().is_empty());
    let http_timeout_secs = get_env("LENSFLOW_HTTP_TIMEOUT_SECS")
      .unwrap_or_else(|_| "15".to_string())
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid LENSFLOW_HTTP_TIMEOUT_SECS: {}", e)))?;
    let order_ref_prefix = get_env("LENSFLOW_ORDER_REF_PREFIX").unwrap_or_else(|_| "VSU".to_string());
    let session_dir = get_env("LENSFLOW_SESSION_DIR")
      .map(PathBuf::from)
      .unwrap_or_else(|_| env::temp_dir().join("lensflow"));
    let resume_ttl = parse_resume_ttl(&get_env("LENSFLOW_RESUME_TTL_MINUTES").unwrap_or_else(|_| "30".to_string()))?;
    let role = get_env("LENSFLOW_ROLE")
      .unwrap_or_else(|_| "admin".to_string())
      .parse::<Role>()
      .map_err(|e| AppError::Config(format!("Invalid LENSFLOW_ROLE: {}", e)))?;

    tracing::info!(api_base_url = %api_base_url, role = role.as_str(), "Desk configuration loaded.");

    Ok(Self {
      api_base_url,
      api_token,
      http_timeout_secs,
      order_ref_prefix,
      session_dir,
      resume_ttl,
      role,
    })
  }

  pub fn lifecycle_settings(&self) -> LifecycleSettings {
    LifecycleSettings {
      gateway: GatewayReturnRules {
        order_ref_prefix: self.order_ref_prefix.clone(),
        ..GatewayReturnRules::default()
      },
      resume_ttl: self.resume_ttl,
    }
  }
}

fn parse_base_url(raw: &str) -> Result<String> {
  let trimmed = raw.trim();
  match Url::parse(trimmed) {
    Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => Ok(trimmed.to_string()),
    Ok(url) => Err(AppError::Config(format!(
      "LENSFLOW_API_BASE_URL must be an http(s) URL with a host, got scheme '{}'",
      url.scheme()
    ))),
    Err(e) => Err(AppError::Config(format!("Invalid LENSFLOW_API_BASE_URL '{}': {}", trimmed, e))),
  }
}

fn parse_resume_ttl(raw: &str) -> Result<TimeDelta> {
  let minutes = raw
    .trim()
    .parse::<i64>()
    .map_err(|e| AppError::Config(format!("Invalid LENSFLOW_RESUME_TTL_MINUTES: {}", e)))?;
  if minutes <= 0 {
    return Err(AppError::Config(format!(
      "LENSFLOW_RESUME_TTL_MINUTES must be positive, got {}",
      minutes
    )));
  }
  TimeDelta::try_minutes(minutes)
    .ok_or_else(|| AppError::Config(format!("LENSFLOW_RESUME_TTL_MINUTES is out of range: {}", minutes)))
}
