// lensflow/src/correlator/params.rs

use crate::model::OrderId;
use crate::settings::GatewayReturnRules;
use std::collections::HashMap;
use url::Url;

/// The gateway's verdict as read off the return URL. Display-only: nothing
/// here is trusted beyond picking which order to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayReturn {
  pub response_code: String,
  pub transaction_status: String,
  /// Order reference as the gateway echoed it, prefix included.
  pub order_ref: String,
  pub order_id: OrderId,
}

impl GatewayReturn {
  /// Reads the gateway parameters from a full return URL or a bare query
  /// string (leading `?` optional).
  pub fn parse(input: &str, rules: &GatewayReturnRules) -> Result<Self, String> {
    let params = query_params(input.trim());
    let take = |name: &str| -> Result<String, String> {
      params
        .get(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| format!("missing gateway parameter '{}'", name))
    };

    let response_code = take(&rules.response_code_param)?;
    let transaction_status = take(&rules.transaction_status_param)?;
    let order_ref = take(&rules.order_ref_param)?;
    let order_id = order_id_from_ref(&order_ref, &rules.order_ref_prefix)?;

    Ok(Self {
      response_code,
      transaction_status,
      order_ref,
      order_id,
    })
  }

  pub fn is_success(&self, rules: &GatewayReturnRules) -> bool {
    self.response_code == rules.success_code && self.transaction_status == rules.success_code
  }
}

/// First value wins when a parameter repeats.
fn query_params(input: &str) -> HashMap<String, String> {
  let pairs: Vec<(String, String)> = match Url::parse(input) {
    Ok(url) => url.query_pairs().into_owned().collect(),
    Err(_) => url::form_urlencoded::parse(input.trim_start_matches('?').as_bytes())
      .into_owned()
      .collect(),
  };
  let mut params = HashMap::new();
  for (key, value) in pairs {
    params.entry(key).or_insert(value);
  }
  params
}

/// `"VSU482"` with prefix `"VSU"` yields `482`.
pub fn order_id_from_ref(order_ref: &str, prefix: &str) -> Result<OrderId, String> {
  let digits = order_ref
    .strip_prefix(prefix)
    .ok_or_else(|| format!("order reference '{}' does not start with '{}'", order_ref, prefix))?;
  match digits.parse::<OrderId>() {
    Ok(id) if id > 0 => Ok(id),
    _ => Err(format!("order reference '{}' does not carry an order id", order_ref)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rules() -> GatewayReturnRules {
    GatewayReturnRules::default()
  }

  #[test]
  fn parses_full_return_url() {
    let parsed = GatewayReturn::parse(
      "https://desk.example.com/payment-return?vnp_Amount=20000000&vnp_ResponseCode=00&vnp_TransactionStatus=00&vnp_TxnRef=VSU482",
      &rules(),
    )
    .unwrap();
    assert_eq!(parsed.order_id, 482);
    assert_eq!(parsed.order_ref, "VSU482");
    assert!(parsed.is_success(&rules()));
  }

  #[test]
  fn parses_bare_query() {
    let parsed = GatewayReturn::parse("?vnp_ResponseCode=24&vnp_TransactionStatus=02&vnp_TxnRef=VSU7", &rules()).unwrap();
    assert_eq!(parsed.order_id, 7);
    assert!(!parsed.is_success(&rules()));
  }

  #[test]
  fn both_codes_must_succeed() {
    let parsed = GatewayReturn::parse("vnp_ResponseCode=00&vnp_TransactionStatus=01&vnp_TxnRef=VSU7", &rules()).unwrap();
    assert!(!parsed.is_success(&rules()));
  }

  #[test]
  fn rejects_missing_or_malformed_reference() {
    assert!(GatewayReturn::parse("vnp_ResponseCode=00&vnp_TransactionStatus=00", &rules()).is_err());
    assert!(GatewayReturn::parse("vnp_ResponseCode=00&vnp_TransactionStatus=00&vnp_TxnRef=482", &rules()).is_err());
    assert!(GatewayReturn::parse("vnp_ResponseCode=00&vnp_TransactionStatus=00&vnp_TxnRef=VSUabc", &rules()).is_err());
    assert!(GatewayReturn::parse("vnp_ResponseCode=00&vnp_TransactionStatus=00&vnp_TxnRef=VSU-3", &rules()).is_err());
    assert!(GatewayReturn::parse("", &rules()).is_err());
  }

  #[test]
  fn prefix_is_configurable() {
    assert_eq!(order_id_from_ref("ORD-15", "ORD-"), Ok(15));
  }
}
