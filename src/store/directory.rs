//! Employee list used to populate the feed filter.

use crate::api::types::Employee;
use crate::api::{FetchGateway, LoadingFlag};
use crate::error::RemoteError;

/// Employee list backing the feed filter.
pub struct EmployeeDirectory {
  gateway: FetchGateway,
  data: Vec<Employee>,
  loading: LoadingFlag,
}

impl EmployeeDirectory {
  pub fn new(gateway: FetchGateway) -> Self {
    Self {
      gateway,
      data: Vec::new(),
      loading: LoadingFlag::new(),
    }
  }

  pub fn data(&self) -> &[Employee] {
    &self.data
  }

  pub fn loading(&self) -> &LoadingFlag {
    &self.loading
  }

  pub fn find(&self, employee_id: &str) -> Option<&Employee> {
    self.data.iter().find(|e| e.id == employee_id)
  }

  pub async fn fetch_all(&mut self) -> Result<(), RemoteError> {
    let _loading = self.loading.begin();
    self.data = self.gateway.employees().await?;
    Ok(())
  }

}
