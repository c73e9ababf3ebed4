// lensflow-desk/src/state.rs
use crate::config::AppConfig;
use crate::errors::Result;
use crate::services::api_client::ApiClient;
use crate::services::console::{ConsoleNavigator, ConsoleNotifier};
use crate::services::order_api::{RestConfirmationUploader, RestOrderService};
use crate::services::payment_api::RestPaymentGateway;
use crate::services::session_store::FileResumeStore;
use lensflow::{LifecycleSettings, Services};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub config: Arc<AppConfig>,
  pub services: Services,
  pub settings: LifecycleSettings,
}

impl AppState {
  pub fn build(config: Arc<AppConfig>) -> Result<Self> {
    let api = ApiClient::new(&config)?;
    let services = Services {
      orders: Arc::new(RestOrderService::new(api.clone())),
      payments: Arc::new(RestPaymentGateway::new(api.clone())),
      uploader: Arc::new(RestConfirmationUploader::new(api)),
      resume: Arc::new(FileResumeStore::new(&config.session_dir)),
      notifier: Arc::new(ConsoleNotifier),
      navigator: Arc::new(ConsoleNavigator),
    };
    let settings = config.lifecycle_settings();
    Ok(Self {
      config,
      services,
      settings,
    })
  }
}
