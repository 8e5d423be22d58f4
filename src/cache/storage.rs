//! In-memory request cache shared by the gateway and the approval overlay.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use super::key::belongs_to;
use crate::api::Endpoint;

/// Session-wide map from cache key to serialized payload.
///
/// Cloning yields another handle onto the same entries. The session creates
/// one cache and hands clones to every component that reads or writes it.
/// Every operation is total.
#[derive(Clone, Default)]
pub struct RequestCache {
  entries: Arc<Mutex<HashMap<String, String>>>,
}

impl RequestCache {
  pub fn new() -> Self {
    Self::default()
  }

  fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
    // A panic while holding the lock cannot leave a half-written String
    // behind, so the map is still usable.
    self
      .entries
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  pub fn get(&self, key: &str) -> Option<String> {
    self.entries().get(key).cloned()
  }

  /// Store `payload` under `key`, replacing any previous entry.
  pub fn set(&self, key: impl Into<String>, payload: impl Into<String>) {
    self.entries().insert(key.into(), payload.into());
  }

  pub fn clear_all(&self) {
    let mut entries = self.entries();
    debug!(count = entries.len(), "clearing request cache");
    entries.clear();
  }

  /// Drop every entry derived for one of `endpoints`.
  pub fn clear_by_endpoint(&self, endpoints: &[Endpoint]) {
    let mut entries = self.entries();
    let before = entries.len();
    entries.retain(|key, _| !endpoints.iter().any(|e| belongs_to(key, *e)));
    debug!(
      removed = before - entries.len(),
      ?endpoints,
      "cleared cache entries by endpoint"
    );
  }

  /// Entries whose key starts with `prefix`, as (key, payload) pairs.
  pub fn entries_with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
    self
      .entries()
      .iter()
      .filter(|(key, _)| key.starts_with(prefix))
      .map(|(key, payload)| (key.clone(), payload.clone()))
      .collect()
  }

  pub fn len(&self) -> usize {
    self.entries().len()
  }

  #[allow(dead_code)]
  pub fn is_empty(&self) -> bool {
    self.entries().is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::derive_key;
  use serde_json::json;

  #[test]
  fn test_set_then_get() {
    let cache = RequestCache::new();
    cache.set("employees", "[]");
    assert_eq!(cache.get("employees").as_deref(), Some("[]"));
    assert_eq!(cache.get("missing"), None);
  }

  #[test]
  fn test_set_overwrites() {
    let cache = RequestCache::new();
    cache.set("k", "1");
    cache.set("k", "2");
    assert_eq!(cache.get("k").as_deref(), Some("2"));
    assert_eq!(cache.len(), 1);
  }

  #[test]
  fn test_clear_all() {
    let cache = RequestCache::new();
    cache.set("a", "1");
    cache.set("b", "2");

    cache.clear_all();

    assert!(cache.is_empty());
    assert_eq!(cache.get("a"), None);
    assert_eq!(cache.get("b"), None);
  }

  #[test]
  fn test_clones_share_entries() {
    let cache = RequestCache::new();
    let other = cache.clone();
    other.set("k", "v");
    assert_eq!(cache.get("k").as_deref(), Some("v"));
  }

  #[test]
  fn test_clear_by_endpoint_keeps_other_families() {
    let cache = RequestCache::new();
    let page0 = derive_key(Endpoint::PaginatedTransactions, Some(&json!({ "page": 0 })));
    let page1 = derive_key(Endpoint::PaginatedTransactions, Some(&json!({ "page": 1 })));
    let employee = derive_key(
      Endpoint::TransactionsByEmployee,
      Some(&json!({ "employeeId": "e1" })),
    );
    cache.set(&page0, "{}");
    cache.set(&page1, "{}");
    cache.set(&employee, "[]");
    cache.set("employees", "[]");

    cache.clear_by_endpoint(&[Endpoint::PaginatedTransactions, Endpoint::Employees]);

    assert_eq!(cache.get(&page0), None);
    assert_eq!(cache.get(&page1), None);
    assert_eq!(cache.get("employees"), None);
    assert_eq!(cache.get(&employee).as_deref(), Some("[]"));
  }

  #[test]
  fn test_entries_with_prefix() {
    let cache = RequestCache::new();
    cache.set("transactionApproval@t1", "true");
    cache.set("transactionsByEmployee@{}", "[]");

    let entries = cache.entries_with_prefix("transactionApproval@");
    assert_eq!(
      entries,
      vec![("transactionApproval@t1".to_string(), "true".to_string())]
    );
  }
}
