// lensflow/src/settings.rs

use chrono::Duration;

/// How the gateway encodes its verdict on the return URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayReturnRules {
  pub response_code_param: String,
  pub transaction_status_param: String,
  pub order_ref_param: String,
  /// Value both codes carry on success.
  pub success_code: String,
  /// Prefix this system puts in front of the numeric order id before
  /// redirecting, e.g. `VSU` in `VSU482`.
  pub order_ref_prefix: String,
}

impl Default for GatewayReturnRules {
  fn default() -> Self {
    Self {
      response_code_param: "vnp_ResponseCode".to_string(),
      transaction_status_param: "vnp_TransactionStatus".to_string(),
      order_ref_param: "vnp_TxnRef".to_string(),
      success_code: "00".to_string(),
      order_ref_prefix: "VSU".to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleSettings {
  pub gateway: GatewayReturnRules,
  /// A resume token older than this is treated as left over from an abandoned
  /// attempt and ignored.
  pub resume_ttl: Duration,
}

impl Default for LifecycleSettings {
  fn default() -> Self {
    Self {
      gateway: GatewayReturnRules::default(),
      resume_ttl: Duration::minutes(30),
    }
  }
}
