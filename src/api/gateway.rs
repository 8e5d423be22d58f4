//! Fetch gateway: transport access with transparent caching and approval
//! reconciliation.

use std::sync::Arc;
use tracing::{debug, warn};

use super::types::{Employee, PaginatedResponse, Transaction};
use super::{Endpoint, LoadingFlag, Request, Response, Transport};
use crate::cache::{derive_key, ApprovalOverlay, RequestCache};
use crate::error::RemoteError;

/// Single entry point for every remote call.
///
/// Reads go through the request cache. Transaction-bearing reads always have
/// the approval overlay applied, both before they are cached and when they
/// are served from the cache, so an entry cached before a later approval
/// change never resurfaces the old value. Transport errors propagate as-is;
/// nothing is retried here.
#[derive(Clone)]
pub struct FetchGateway {
  transport: Arc<dyn Transport>,
  cache: RequestCache,
  overlay: ApprovalOverlay,
  loading: LoadingFlag,
}

impl FetchGateway {
  pub fn new(transport: Arc<dyn Transport>, cache: RequestCache) -> Self {
    let overlay = ApprovalOverlay::new(cache.clone());
    Self {
      transport,
      cache,
      overlay,
      loading: LoadingFlag::new(),
    }
  }

  pub fn cache(&self) -> &RequestCache {
    &self.cache
  }

  pub fn overlay(&self) -> &ApprovalOverlay {
    &self.overlay
  }

  /// True while any call made through this gateway (or its clones) is in flight.
  pub fn is_loading(&self) -> bool {
    self.loading.is_loading()
  }

  /// Cache-or-fetch-then-cache.
  pub async fn fetch_with_cache(&self, request: Request) -> Result<Response, RemoteError> {
    let _loading = self.loading.begin();
    let endpoint = request.endpoint();
    let key = derive_key(endpoint, request.params().as_ref());

    if let Some(mut response) = self.read_cached(endpoint, &key) {
      debug!(key, "cache hit");
      self.reconcile(&mut response);
      return Ok(response);
    }

    debug!(key, "cache miss");
    let mut response = self.call(&request).await?;
    self.reconcile(&mut response);
    self.write_cached(key, &response);

    Ok(response)
  }

  /// Always calls the transport and never touches cached reads.
  ///
  /// A successful approval write is recorded in the overlay before returning.
  pub async fn fetch_without_cache(&self, request: Request) -> Result<Response, RemoteError> {
    let _loading = self.loading.begin();
    let response = self.call(&request).await?;

    if let Request::SetTransactionApproval(params) = &request {
      self.overlay.record(&params.transaction_id, params.value);
    }

    Ok(response)
  }

  /// Drop every cached response and approval override.
  pub fn clear_cache(&self) {
    self.cache.clear_all();
  }

  /// Drop cached responses for the given endpoint families.
  pub fn clear_cache_by_endpoint(&self, endpoints: &[Endpoint]) {
    self.cache.clear_by_endpoint(endpoints);
  }

  pub async fn employees(&self) -> Result<Vec<Employee>, RemoteError> {
    match self.fetch_with_cache(Request::Employees).await? {
      Response::Employees(employees) => Ok(employees),
      other => Err(RemoteError::unexpected_response(
        Endpoint::Employees,
        other.endpoint(),
      )),
    }
  }

  pub async fn paginated_transactions(
    &self,
    page: u32,
  ) -> Result<PaginatedResponse<Transaction>, RemoteError> {
    match self.fetch_with_cache(Request::page(page)).await? {
      Response::PaginatedTransactions(page) => Ok(page),
      other => Err(RemoteError::unexpected_response(
        Endpoint::PaginatedTransactions,
        other.endpoint(),
      )),
    }
  }

  pub async fn transactions_by_employee(
    &self,
    employee_id: &str,
  ) -> Result<Vec<Transaction>, RemoteError> {
    match self.fetch_with_cache(Request::by_employee(employee_id)).await? {
      Response::TransactionsByEmployee(list) => Ok(list),
      other => Err(RemoteError::unexpected_response(
        Endpoint::TransactionsByEmployee,
        other.endpoint(),
      )),
    }
  }

  pub async fn set_transaction_approval(
    &self,
    transaction_id: &str,
    value: bool,
  ) -> Result<(), RemoteError> {
    self
      .fetch_without_cache(Request::set_approval(transaction_id, value))
      .await
      .map(|_| ())
  }

  async fn call(&self, request: &Request) -> Result<Response, RemoteError> {
    debug!(request = %request.description(), "calling transport");
    let response = self.transport.call(request).await.map_err(|e| {
      warn!(error = %e, "transport call failed");
      e
    })?;

    if response.endpoint() != request.endpoint() {
      return Err(RemoteError::unexpected_response(
        request.endpoint(),
        response.endpoint(),
      ));
    }

    Ok(response)
  }

  fn reconcile(&self, response: &mut Response) {
    if !response.endpoint().carries_transactions() {
      return;
    }
    if let Some(transactions) = response.transactions_mut() {
      self.overlay.apply(transactions);
    }
  }

  fn read_cached(&self, endpoint: Endpoint, key: &str) -> Option<Response> {
    let payload = self.cache.get(key)?;
    match Response::decode(endpoint, &payload) {
      Ok(response) => Some(response),
      Err(e) => {
        warn!(key, error = %e, "discarding unreadable cache entry");
        None
      }
    }
  }

  fn write_cached(&self, key: String, response: &Response) {
    match response.encode() {
      Ok(payload) => self.cache.set(key, payload),
      Err(e) => warn!(key, error = %e, "failed to serialize response, not caching"),
    }
  }
}
