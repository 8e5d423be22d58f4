//! In-flight tracking for fetches.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Observable "something is loading" state.
///
/// Each store owns one flag for its own fetches; the gateway keeps an
/// aggregate one covering every call made through it. Clones observe the
/// same state, so a UI can hold a handle while the owner is busy.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag {
  in_flight: Arc<AtomicUsize>,
}

impl LoadingFlag {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_loading(&self) -> bool {
    self.in_flight.load(Ordering::SeqCst) > 0
  }

  /// Mark one call as in flight until the returned guard is dropped.
  #[must_use = "the flag is cleared as soon as the guard is dropped"]
  pub fn begin(&self) -> LoadingGuard {
    self.in_flight.fetch_add(1, Ordering::SeqCst);
    LoadingGuard {
      in_flight: Arc::clone(&self.in_flight),
    }
  }
}

/// Clears its share of a [`LoadingFlag`] on drop, including on error paths.
#[derive(Debug)]
pub struct LoadingGuard {
  in_flight: Arc<AtomicUsize>,
}

impl Drop for LoadingGuard {
  fn drop(&mut self) {
    self.in_flight.fetch_sub(1, Ordering::SeqCst);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_guard_scopes_loading() {
    let flag = LoadingFlag::new();
    assert!(!flag.is_loading());

    let guard = flag.begin();
    assert!(flag.is_loading());

    drop(guard);
    assert!(!flag.is_loading());
  }

  #[test]
  fn test_overlapping_calls_share_flag() {
    let flag = LoadingFlag::new();
    let observer = flag.clone();

    let first = flag.begin();
    let second = flag.begin();
    drop(first);
    assert!(observer.is_loading());

    drop(second);
    assert!(!observer.is_loading());
  }
}
