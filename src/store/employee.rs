//! Transactions of a single employee.

use tracing::debug;

use crate::api::types::Transaction;
use crate::api::{FetchGateway, LoadingFlag};
use crate::error::RemoteError;

/// Holds the transaction list of exactly one employee; every fetch replaces
/// it wholesale.
pub struct EmployeeFeedStore {
  gateway: FetchGateway,
  data: Vec<Transaction>,
  loading: LoadingFlag,
}

impl EmployeeFeedStore {
  pub fn new(gateway: FetchGateway) -> Self {
    Self {
      gateway,
      data: Vec::new(),
      loading: LoadingFlag::new(),
    }
  }

  pub fn data(&self) -> &[Transaction] {
    &self.data
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  pub fn loading(&self) -> &LoadingFlag {
    &self.loading
  }

  /// Load `employee_id`'s transactions, replacing whatever was held.
  ///
  /// On failure the previous list is kept.
  pub async fn fetch_for_employee(&mut self, employee_id: &str) -> Result<(), RemoteError> {
    let _loading = self.loading.begin();
    let data = self.gateway.transactions_by_employee(employee_id).await?;

    debug!(employee_id, count = data.len(), "loaded employee transactions");
    self.data = data;

    Ok(())
  }

  pub fn invalidate(&mut self) {
    self.data.clear();
  }

  /// Overwrite the list, used to publish optimistic or reverted lists.
  pub fn replace(&mut self, data: Vec<Transaction>) {
    self.data = data;
  }
}
