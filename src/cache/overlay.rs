//! Locally recorded approval values, reconciled onto fetched transactions.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::storage::RequestCache;
use crate::api::types::Transaction;

/// Key prefix for overlay entries inside the request cache.
const APPROVAL_KEY_PREFIX: &str = "transactionApproval@";

/// Approval overrides keyed by transaction id.
///
/// Entries live in the request cache under `transactionApproval@<id>` and
/// never expire within a session.
#[derive(Clone)]
pub struct ApprovalOverlay {
  cache: RequestCache,
}

impl ApprovalOverlay {
  pub fn new(cache: RequestCache) -> Self {
    Self { cache }
  }

  fn key(transaction_id: &str) -> String {
    format!("{}{}", APPROVAL_KEY_PREFIX, transaction_id)
  }

  /// Record the last known approval value for a transaction.
  pub fn record(&self, transaction_id: &str, approved: bool) {
    debug!(transaction_id, approved, "recording approval overlay");
    self
      .cache
      .set(Self::key(transaction_id), approved.to_string());
  }

  #[allow(dead_code)]
  pub fn get(&self, transaction_id: &str) -> Option<bool> {
    let payload = self.cache.get(&Self::key(transaction_id))?;
    serde_json::from_str(&payload).ok()
  }

  /// Every recorded override.
  pub fn entries(&self) -> HashMap<String, bool> {
    self
      .cache
      .entries_with_prefix(APPROVAL_KEY_PREFIX)
      .into_iter()
      .filter_map(|(key, payload)| {
        let id = key.strip_prefix(APPROVAL_KEY_PREFIX)?.to_string();
        match serde_json::from_str::<bool>(&payload) {
          Ok(approved) => Some((id, approved)),
          Err(e) => {
            warn!(key, error = %e, "ignoring unreadable approval overlay entry");
            None
          }
        }
      })
      .collect()
  }

  /// Patch the approval flag of every transaction that has an override.
  ///
  /// Order and all other fields are left untouched. Returns how many
  /// transactions were changed.
  pub fn apply(&self, transactions: &mut [Transaction]) -> usize {
    let overrides = self.entries();
    if overrides.is_empty() {
      return 0;
    }

    let mut changed = 0;
    for transaction in transactions.iter_mut() {
      if let Some(&approved) = overrides.get(&transaction.id) {
        if transaction.approved != approved {
          transaction.approved = approved;
          changed += 1;
        }
      }
    }

    if changed > 0 {
      debug!(changed, "applied approval overlay");
    }
    changed
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::transaction;

  fn overlay() -> ApprovalOverlay {
    ApprovalOverlay::new(RequestCache::new())
  }

  #[test]
  fn test_record_and_get() {
    let overlay = overlay();
    assert_eq!(overlay.get("t1"), None);

    overlay.record("t1", true);
    assert_eq!(overlay.get("t1"), Some(true));

    overlay.record("t1", false);
    assert_eq!(overlay.get("t1"), Some(false));
  }

  #[test]
  fn test_entries_live_in_request_cache() {
    let cache = RequestCache::new();
    let overlay = ApprovalOverlay::new(cache.clone());

    overlay.record("t1", true);

    assert_eq!(cache.get("transactionApproval@t1").as_deref(), Some("true"));
  }

  #[test]
  fn test_apply_patches_only_overridden_transactions() {
    let overlay = overlay();
    overlay.record("t2", true);

    let mut list = vec![
      transaction("t1", false),
      transaction("t2", false),
      transaction("t3", false),
    ];
    let original = list.clone();

    assert_eq!(overlay.apply(&mut list), 1);

    let ids: Vec<_> = list.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t2", "t3"]);
    assert!(list[1].approved);
    assert_eq!(list[0], original[0]);
    assert_eq!(list[2], original[2]);
    assert_eq!(list[1].amount, original[1].amount);
    assert_eq!(list[1].merchant, original[1].merchant);
  }

  #[test]
  fn test_apply_is_idempotent() {
    let overlay = overlay();
    overlay.record("t1", false);
    overlay.record("t3", true);

    let mut once = vec![
      transaction("t1", true),
      transaction("t2", true),
      transaction("t3", false),
    ];
    overlay.apply(&mut once);

    let mut twice = once.clone();
    assert_eq!(overlay.apply(&mut twice), 0);
    assert_eq!(once, twice);
  }

  #[test]
  fn test_unreadable_entry_is_ignored() {
    let cache = RequestCache::new();
    cache.set("transactionApproval@t1", "maybe");
    let overlay = ApprovalOverlay::new(cache);

    let mut list = vec![transaction("t1", false)];
    assert_eq!(overlay.apply(&mut list), 0);
    assert!(!list[0].approved);
  }
}
