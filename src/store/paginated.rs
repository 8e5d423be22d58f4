//! Paginated feed of every transaction.

use std::collections::HashMap;
use tracing::debug;

use crate::api::types::Transaction;
use crate::api::{FetchGateway, LoadingFlag};
use crate::error::RemoteError;

/// Cursor of a freshly created or invalidated feed.
pub const FIRST_PAGE: u32 = 0;

/// Accumulates pages of the global transaction feed.
///
/// `data` never holds two transactions with the same id. `next_page` is
/// `None` once the last page has been merged.
pub struct PaginatedFeedStore {
  gateway: FetchGateway,
  data: Vec<Transaction>,
  next_page: Option<u32>,
  loading: LoadingFlag,
}

impl PaginatedFeedStore {
  pub fn new(gateway: FetchGateway) -> Self {
    Self {
      gateway,
      data: Vec::new(),
      next_page: Some(FIRST_PAGE),
      loading: LoadingFlag::new(),
    }
  }

  pub fn data(&self) -> &[Transaction] {
    &self.data
  }

  pub fn next_page(&self) -> Option<u32> {
    self.next_page
  }

  pub fn has_more(&self) -> bool {
    self.next_page.is_some()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  /// Handle onto this store's own loading state.
  pub fn loading(&self) -> &LoadingFlag {
    &self.loading
  }

  /// Fetch the page at the cursor and merge it in.
  ///
  /// Does nothing once the feed is exhausted. On failure the accumulated
  /// data and cursor are left exactly as they were.
  pub async fn fetch_next_page(&mut self) -> Result<(), RemoteError> {
    let Some(page) = self.next_page else {
      debug!("paginated feed exhausted, nothing to fetch");
      return Ok(());
    };

    let _loading = self.loading.begin();
    let response = self.gateway.paginated_transactions(page).await?;

    let added = self.merge(response.data);
    self.next_page = response.next_page;
    debug!(page, added, total = self.data.len(), next_page = ?self.next_page, "merged page");

    Ok(())
  }

  /// Reset to an empty feed positioned at the first page.
  pub fn invalidate(&mut self) {
    self.data.clear();
    self.next_page = Some(FIRST_PAGE);
  }

  /// Overwrite the whole state, used to publish optimistic or reverted lists.
  pub fn replace(&mut self, data: Vec<Transaction>, next_page: Option<u32>) {
    self.data = data;
    self.next_page = next_page;
  }

  /// Merge `incoming` by id, returning how many transactions were new.
  ///
  /// Known transactions take the incoming fields but keep their local
  /// approval flag, which may carry an optimistic change the fetched data
  /// does not reflect yet. New transactions are appended in arrival order.
  fn merge(&mut self, incoming: Vec<Transaction>) -> usize {
    let mut positions: HashMap<String, usize> = self
      .data
      .iter()
      .enumerate()
      .map(|(i, t)| (t.id.clone(), i))
      .collect();

    let mut added = 0;
    for mut transaction in incoming {
      match positions.get(&transaction.id) {
        Some(&i) => {
          transaction.approved = self.data[i].approved;
          self.data[i] = transaction;
        }
        None => {
          positions.insert(transaction.id.clone(), self.data.len());
          self.data.push(transaction);
          added += 1;
        }
      }
    }
    added
  }
}
