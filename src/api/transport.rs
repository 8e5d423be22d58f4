//! Transport boundary and the fixture-backed transport used by the session.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

use super::endpoint::{Endpoint, Request, Response};
use super::types::{
  Employee, PaginatedRequestParams, PaginatedResponse, SetTransactionApprovalParams, Transaction,
};
use crate::config::TransportConfig;
use crate::error::RemoteError;

const SAMPLE_FIXTURES: &str = include_str!("../../fixtures/sample.json");

/// Asynchronous request function the data-access layer sits on.
///
/// Given a request it eventually answers with the response for that endpoint
/// or fails. Implementations decide latency and failure behaviour.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn call(&self, request: &Request) -> Result<Response, RemoteError>;
}

/// Data served by [`FixtureTransport`].
#[derive(Debug, Clone, Deserialize)]
pub struct Fixtures {
  pub employees: Vec<Employee>,
  pub transactions: Vec<Transaction>,
}

impl Fixtures {
  /// The bundled sample data set.
  pub fn sample() -> Result<Self> {
    serde_json::from_str(SAMPLE_FIXTURES).map_err(|e| eyre!("Failed to parse bundled fixtures: {}", e))
  }

  pub fn load(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read fixtures {}: {}", path.display(), e))?;

    serde_json::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse fixtures {}: {}", path.display(), e))
  }
}

/// In-process transport answering from a fixture data set.
///
/// Approval writes are applied to the fixture data, so later uncached reads
/// observe them just like a real backend would.
pub struct FixtureTransport {
  employees: Vec<Employee>,
  transactions: Mutex<Vec<Transaction>>,
  page_size: usize,
  latency: Duration,
  failing_transactions: BTreeSet<String>,
  calls: Mutex<HashMap<Endpoint, usize>>,
}

impl FixtureTransport {
  pub fn new(fixtures: Fixtures, page_size: usize) -> Self {
    Self {
      employees: fixtures.employees,
      transactions: Mutex::new(fixtures.transactions),
      page_size: page_size.max(1),
      latency: Duration::ZERO,
      failing_transactions: BTreeSet::new(),
      calls: Mutex::new(HashMap::new()),
    }
  }

  /// Build the transport described by the session configuration.
  pub fn from_config(config: &TransportConfig) -> Result<Self> {
    let fixtures = match &config.fixtures {
      Some(path) => Fixtures::load(path)?,
      None => Fixtures::sample()?,
    };

    info!(
      employees = fixtures.employees.len(),
      transactions = fixtures.transactions.len(),
      page_size = config.page_size,
      "fixture transport ready"
    );

    Ok(
      Self::new(fixtures, config.page_size)
        .with_latency(Duration::from_millis(config.latency_ms))
        .with_failing_transactions(config.failing_transactions.iter().cloned()),
    )
  }

  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = latency;
    self
  }

  /// Approval writes for these transaction ids always fail.
  pub fn with_failing_transactions(mut self, ids: impl IntoIterator<Item = String>) -> Self {
    self.failing_transactions.extend(ids);
    self
  }

  /// Number of calls served (or refused) for `endpoint`.
  pub fn call_count(&self, endpoint: Endpoint) -> usize {
    self
      .calls
      .lock()
      .map(|calls| calls.get(&endpoint).copied().unwrap_or(0))
      .unwrap_or(0)
  }

  fn record_call(&self, endpoint: Endpoint) {
    if let Ok(mut calls) = self.calls.lock() {
      *calls.entry(endpoint).or_insert(0) += 1;
    }
  }

  fn transactions(&self, endpoint: Endpoint) -> Result<std::sync::MutexGuard<'_, Vec<Transaction>>, RemoteError> {
    self
      .transactions
      .lock()
      .map_err(|_| RemoteError::new(endpoint, "fixture data unavailable"))
  }

  fn serve(&self, request: &Request) -> Result<Response, RemoteError> {
    match request {
      Request::Employees => Ok(Response::Employees(self.employees.clone())),
      Request::PaginatedTransactions(params) => self.page(params).map(Response::PaginatedTransactions),
      Request::TransactionsByEmployee(params) => {
        let transactions = self.transactions(Endpoint::TransactionsByEmployee)?;
        let list = transactions
          .iter()
          .filter(|t| t.employee.id == params.employee_id)
          .cloned()
          .collect();
        Ok(Response::TransactionsByEmployee(list))
      }
      Request::SetTransactionApproval(params) => {
        self.set_approval(params)?;
        Ok(Response::ApprovalSet)
      }
    }
  }

  fn page(&self, params: &PaginatedRequestParams) -> Result<PaginatedResponse<Transaction>, RemoteError> {
    let transactions = self.transactions(Endpoint::PaginatedTransactions)?;
    let start = params.page as usize * self.page_size;

    if start > 0 && start >= transactions.len() {
      return Err(RemoteError::new(
        Endpoint::PaginatedTransactions,
        format!("invalid page {}", params.page),
      ));
    }

    let end = (start + self.page_size).min(transactions.len());
    let next_page = if end < transactions.len() {
      Some(params.page + 1)
    } else {
      None
    };

    Ok(PaginatedResponse {
      data: transactions[start..end].to_vec(),
      next_page,
    })
  }

  fn set_approval(&self, params: &SetTransactionApprovalParams) -> Result<(), RemoteError> {
    let endpoint = Endpoint::SetTransactionApproval;
    if self.failing_transactions.contains(&params.transaction_id) {
      return Err(RemoteError::new(endpoint, "approval service unavailable"));
    }

    let mut transactions = self.transactions(endpoint)?;
    let transaction = transactions
      .iter_mut()
      .find(|t| t.id == params.transaction_id)
      .ok_or_else(|| {
        RemoteError::new(
          endpoint,
          format!("unknown transaction {}", params.transaction_id),
        )
      })?;

    transaction.approved = params.value;
    Ok(())
  }
}

#[async_trait]
impl Transport for FixtureTransport {
  async fn call(&self, request: &Request) -> Result<Response, RemoteError> {
    self.record_call(request.endpoint());
    if !self.latency.is_zero() {
      tokio::time::sleep(self.latency).await;
    }

    let result = self.serve(request);
    debug!(request = %request.description(), ok = result.is_ok(), "fixture transport served");
    result
  }
}
