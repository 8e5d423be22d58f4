//! Cache key derivation.

use serde_json::Value;

use crate::api::Endpoint;

/// Separator between the endpoint identifier and its parameters.
pub const KEY_DELIMITER: char = '@';

/// Derive the cache key for a call to `endpoint` with `params`.
///
/// The parameter segment is the compact JSON rendering of `params`. serde_json's
/// default `Map` is ordered by key, so structurally equal objects render
/// identically regardless of how they were built.
pub fn derive_key(endpoint: Endpoint, params: Option<&Value>) -> String {
  match params {
    Some(params) => format!("{}{}{}", endpoint.as_str(), KEY_DELIMITER, params),
    None => endpoint.as_str().to_string(),
  }
}

/// Whether `key` was derived for `endpoint`.
pub fn belongs_to(key: &str, endpoint: Endpoint) -> bool {
  match key.strip_prefix(endpoint.as_str()) {
    Some(rest) => rest.is_empty() || rest.starts_with(KEY_DELIMITER),
    None => false,
  }
}
