//! Error type shared by the transport, gateway, stores and mutator.

use thiserror::Error;

use crate::api::Endpoint;

/// A request to the remote side failed.
///
/// The reason is opaque: callers can only observe *that* the call failed and
/// for which endpoint. Nothing in the data-access layer retries on this error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{endpoint} request failed: {reason}")]
pub struct RemoteError {
  pub endpoint: Endpoint,
  pub reason: String,
}

impl RemoteError {
  pub fn new(endpoint: Endpoint, reason: impl Into<String>) -> Self {
    Self {
      endpoint,
      reason: reason.into(),
    }
  }

  /// The transport answered with a response shaped for a different endpoint.
  pub fn unexpected_response(endpoint: Endpoint, got: Endpoint) -> Self {
    Self::new(endpoint, format!("unexpected {} response", got))
  }
}
