//! Test helpers: a scripted transport and transaction builders.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::types::{Employee, PaginatedResponse, Transaction};
use crate::api::{Endpoint, FetchGateway, Request, Response, Transport};
use crate::cache::{derive_key, RequestCache};
use crate::error::RemoteError;

type Outcome = Result<Response, String>;

#[derive(Default)]
struct Script {
  outcomes: HashMap<String, VecDeque<Outcome>>,
  calls: Vec<Request>,
}

/// Transport answering from canned outcomes keyed by request.
///
/// Outcomes for the same request are served in order; the last one repeats.
/// Unscripted requests fail.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
  script: Arc<Mutex<Script>>,
  latency: Duration,
}

impl ScriptedTransport {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = latency;
    self
  }

  fn key(request: &Request) -> String {
    derive_key(request.endpoint(), request.params().as_ref())
  }

  fn push(&self, request: Request, outcome: Outcome) -> &Self {
    self
      .script
      .lock()
      .unwrap()
      .outcomes
      .entry(Self::key(&request))
      .or_default()
      .push_back(outcome);
    self
  }

  pub fn respond(&self, request: Request, response: Response) -> &Self {
    self.push(request, Ok(response))
  }

  pub fn fail(&self, request: Request, reason: &str) -> &Self {
    self.push(request, Err(reason.to_string()))
  }

  pub fn calls(&self, endpoint: Endpoint) -> usize {
    self
      .script
      .lock()
      .unwrap()
      .calls
      .iter()
      .filter(|r| r.endpoint() == endpoint)
      .count()
  }
}

#[async_trait]
impl Transport for ScriptedTransport {
  async fn call(&self, request: &Request) -> Result<Response, RemoteError> {
    if !self.latency.is_zero() {
      tokio::time::sleep(self.latency).await;
    }

    let mut script = self.script.lock().unwrap();
    script.calls.push(request.clone());

    let outcome = match script.outcomes.get_mut(&Self::key(request)) {
      Some(queue) if queue.len() > 1 => queue.pop_front(),
      Some(queue) => queue.front().cloned(),
      None => None,
    };

    match outcome {
      Some(Ok(response)) => Ok(response),
      Some(Err(reason)) => Err(RemoteError::new(request.endpoint(), reason)),
      None => Err(RemoteError::new(request.endpoint(), "unscripted request")),
    }
  }
}

/// A gateway over `transport` with a fresh cache.
pub fn gateway_with(transport: &ScriptedTransport) -> FetchGateway {
  FetchGateway::new(Arc::new(transport.clone()), RequestCache::new())
}

pub fn employee(id: &str) -> Employee {
  Employee {
    id: id.to_string(),
    first_name: "Test".to_string(),
    last_name: id.to_uppercase(),
  }
}

pub fn transaction(id: &str, approved: bool) -> Transaction {
  Transaction {
    id: id.to_string(),
    amount: 42.5,
    employee: employee("e1"),
    merchant: format!("Merchant {}", id),
    date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    approved,
  }
}

pub fn page(data: Vec<Transaction>, next_page: Option<u32>) -> Response {
  Response::PaginatedTransactions(PaginatedResponse { data, next_page })
}

pub fn ids(transactions: &[Transaction]) -> Vec<&str> {
  transactions.iter().map(|t| t.id.as_str()).collect()
}
