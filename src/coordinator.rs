//! Selection between the global feed and the per-employee feed.

use tracing::{debug, info};

use crate::api::types::{Employee, Transaction};
use crate::api::{FetchGateway, LoadingFlag};
use crate::approval::ApprovalMutator;
use crate::error::RemoteError;
use crate::store::{EmployeeDirectory, EmployeeFeedStore, PaginatedFeedStore};

/// Which feed is authoritative for display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActiveView {
  #[default]
  AllTransactions,
  ByEmployee(String),
}

/// Owns both feed stores and keeps at most one of them populated.
///
/// Switching views clears the store being left (including the paginated
/// cursor). The approval overlay is never cleared by a switch, so approvals
/// made in one view show up in the other.
pub struct ViewCoordinator {
  active: ActiveView,
  paginated: PaginatedFeedStore,
  by_employee: EmployeeFeedStore,
  directory: EmployeeDirectory,
  mutator: ApprovalMutator,
  gateway: FetchGateway,
  switching: LoadingFlag,
}

impl ViewCoordinator {
  pub fn new(gateway: FetchGateway) -> Self {
    Self {
      active: ActiveView::default(),
      paginated: PaginatedFeedStore::new(gateway.clone()),
      by_employee: EmployeeFeedStore::new(gateway.clone()),
      directory: EmployeeDirectory::new(gateway.clone()),
      mutator: ApprovalMutator::new(gateway.clone()),
      gateway,
      switching: LoadingFlag::new(),
    }
  }

  pub fn active_view(&self) -> &ActiveView {
    &self.active
  }

  pub fn paginated(&self) -> &PaginatedFeedStore {
    &self.paginated
  }

  #[cfg(test)]
  pub fn by_employee(&self) -> &EmployeeFeedStore {
    &self.by_employee
  }

  pub fn employees(&self) -> &[Employee] {
    self.directory.data()
  }

  pub fn employee(&self, employee_id: &str) -> Option<&Employee> {
    self.directory.find(employee_id)
  }

  pub fn gateway(&self) -> &FetchGateway {
    &self.gateway
  }

  /// Set while a view switch is loading.
  #[cfg(test)]
  pub fn loading(&self) -> &LoadingFlag {
    &self.switching
  }

  pub fn is_loading(&self) -> bool {
    self.switching.is_loading()
  }

  fn anything_loading(&self) -> bool {
    self.is_loading()
      || self.gateway.is_loading()
      || self.paginated.loading().is_loading()
      || self.by_employee.loading().is_loading()
      || self.directory.loading().is_loading()
  }

  /// Load the employee list behind the filter without switching views.
  pub async fn load_employees(&mut self) -> Result<(), RemoteError> {
    self.directory.fetch_all().await
  }

  /// Apply a filter selection: `None` is the "all employees" entry.
  pub async fn select(&mut self, employee_id: Option<&str>) -> Result<(), RemoteError> {
    match employee_id {
      Some(id) => self.select_employee(id).await,
      None => self.select_all().await,
    }
  }

  /// Show the global feed, loading its first page if it holds nothing.
  pub async fn select_all(&mut self) -> Result<(), RemoteError> {
    let _loading = self.switching.begin();
    info!("showing all transactions");

    self.active = ActiveView::AllTransactions;
    self.by_employee.invalidate();
    self.directory.fetch_all().await?;

    if self.paginated.is_empty() {
      self.paginated.invalidate();
      self.paginated.fetch_next_page().await?;
    }

    Ok(())
  }

  /// Show one employee's transactions, discarding the global feed.
  ///
  /// The previous employee's list is dropped before fetching, so a failed
  /// fetch leaves an empty view rather than another employee's rows.
  pub async fn select_employee(&mut self, employee_id: &str) -> Result<(), RemoteError> {
    let _loading = self.switching.begin();
    info!(employee_id, "showing transactions for employee");

    self.active = ActiveView::ByEmployee(employee_id.to_string());
    self.paginated.invalidate();
    self.by_employee.invalidate();
    self.by_employee.fetch_for_employee(employee_id).await
  }

  /// The list a consumer should render right now.
  ///
  /// Empty while a switch is loading; otherwise the employee feed if it has
  /// anything, else the global feed.
  pub fn transactions(&self) -> &[Transaction] {
    if self.is_loading() {
      return &[];
    }
    if !self.by_employee.is_empty() {
      return self.by_employee.data();
    }
    self.paginated.data()
  }

  /// Whether "load more" should be offered.
  pub fn can_load_more(&self) -> bool {
    self.active == ActiveView::AllTransactions
      && self.by_employee.is_empty()
      && self.paginated.has_more()
  }

  /// Fetch the next page of the global feed.
  ///
  /// Ignored when not offered or while anything is loading.
  pub async fn load_more(&mut self) -> Result<(), RemoteError> {
    if !self.can_load_more() || self.anything_loading() {
      debug!("load more ignored");
      return Ok(());
    }
    self.paginated.fetch_next_page().await
  }

  /// Change a transaction's approval in the active view.
  ///
  /// The change is published to the active store immediately and reverted
  /// there if the write fails.
  pub async fn set_approval(&mut self, transaction_id: &str, approved: bool) -> Result<(), RemoteError> {
    let current = self.transactions().to_vec();
    let Self {
      active,
      paginated,
      by_employee,
      mutator,
      ..
    } = self;

    mutator
      .set_approval(transaction_id, approved, &current, |list| match active {
        ActiveView::AllTransactions => {
          let next_page = paginated.next_page();
          paginated.replace(list, next_page);
        }
        ActiveView::ByEmployee(_) => by_employee.replace(list),
      })
      .await
  }

  /// Flip a transaction's approval. Returns the new value.
  pub async fn toggle_approval(&mut self, transaction_id: &str) -> Result<Option<bool>, RemoteError> {
    let Some(current) = self
      .transactions()
      .iter()
      .find(|t| t.id == transaction_id)
      .map(|t| t.approved)
    else {
      return Ok(None);
    };

    self.set_approval(transaction_id, !current).await?;
    Ok(Some(!current))
  }
}
