//! Registered endpoints and their statically typed requests and responses.

use serde_json::{json, Value};
use std::fmt;

use super::types::{
  Employee, PaginatedRequestParams, PaginatedResponse, RequestByEmployeeParams,
  SetTransactionApprovalParams, Transaction,
};

/// The fixed set of endpoints the transport understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
  Employees,
  PaginatedTransactions,
  TransactionsByEmployee,
  SetTransactionApproval,
}

impl Endpoint {
  pub const ALL: [Endpoint; 4] = [
    Endpoint::Employees,
    Endpoint::PaginatedTransactions,
    Endpoint::TransactionsByEmployee,
    Endpoint::SetTransactionApproval,
  ];

  /// Identifier used on the wire and as the cache key prefix.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Employees => "employees",
      Self::PaginatedTransactions => "paginatedTransactions",
      Self::TransactionsByEmployee => "transactionsByEmployee",
      Self::SetTransactionApproval => "setTransactionApproval",
    }
  }

  /// Read endpoints whose responses carry transactions and so must be
  /// reconciled with locally recorded approvals.
  pub fn carries_transactions(self) -> bool {
    matches!(
      self,
      Self::PaginatedTransactions | Self::TransactionsByEmployee
    )
  }
}

impl fmt::Display for Endpoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A call to one endpoint together with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
  Employees,
  PaginatedTransactions(PaginatedRequestParams),
  TransactionsByEmployee(RequestByEmployeeParams),
  SetTransactionApproval(SetTransactionApprovalParams),
}

impl Request {
  pub fn page(page: u32) -> Self {
    Self::PaginatedTransactions(PaginatedRequestParams { page })
  }

  pub fn by_employee(employee_id: impl Into<String>) -> Self {
    Self::TransactionsByEmployee(RequestByEmployeeParams {
      employee_id: employee_id.into(),
    })
  }

  pub fn set_approval(transaction_id: impl Into<String>, value: bool) -> Self {
    Self::SetTransactionApproval(SetTransactionApprovalParams {
      transaction_id: transaction_id.into(),
      value,
    })
  }

  pub fn endpoint(&self) -> Endpoint {
    match self {
      Self::Employees => Endpoint::Employees,
      Self::PaginatedTransactions(_) => Endpoint::PaginatedTransactions,
      Self::TransactionsByEmployee(_) => Endpoint::TransactionsByEmployee,
      Self::SetTransactionApproval(_) => Endpoint::SetTransactionApproval,
    }
  }

  /// Parameters in their wire shape, `None` for parameterless endpoints.
  pub fn params(&self) -> Option<Value> {
    match self {
      Self::Employees => None,
      Self::PaginatedTransactions(p) => Some(json!({ "page": p.page })),
      Self::TransactionsByEmployee(p) => Some(json!({ "employeeId": p.employee_id })),
      Self::SetTransactionApproval(p) => Some(json!({
        "transactionId": p.transaction_id,
        "value": p.value,
      })),
    }
  }

  /// Human readable description for logs.
  pub fn description(&self) -> String {
    match self {
      Self::Employees => "employee directory".to_string(),
      Self::PaginatedTransactions(p) => format!("transactions page {}", p.page),
      Self::TransactionsByEmployee(p) => format!("transactions for employee {}", p.employee_id),
      Self::SetTransactionApproval(p) => {
        format!("approval of {} -> {}", p.transaction_id, p.value)
      }
    }
  }
}

/// Transport answer, one variant per endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
  Employees(Vec<Employee>),
  PaginatedTransactions(PaginatedResponse<Transaction>),
  TransactionsByEmployee(Vec<Transaction>),
  ApprovalSet,
}

impl Response {
  pub fn endpoint(&self) -> Endpoint {
    match self {
      Self::Employees(_) => Endpoint::Employees,
      Self::PaginatedTransactions(_) => Endpoint::PaginatedTransactions,
      Self::TransactionsByEmployee(_) => Endpoint::TransactionsByEmployee,
      Self::ApprovalSet => Endpoint::SetTransactionApproval,
    }
  }

  /// The transaction list carried by this response, bare or inside a page.
  pub fn transactions_mut(&mut self) -> Option<&mut Vec<Transaction>> {
    match self {
      Self::PaginatedTransactions(page) => Some(&mut page.data),
      Self::TransactionsByEmployee(list) => Some(list),
      Self::Employees(_) | Self::ApprovalSet => None,
    }
  }

  /// Serialize the payload in its wire shape (bare list, page wrapper, or null).
  pub fn encode(&self) -> serde_json::Result<String> {
    match self {
      Self::Employees(employees) => serde_json::to_string(employees),
      Self::PaginatedTransactions(page) => serde_json::to_string(page),
      Self::TransactionsByEmployee(list) => serde_json::to_string(list),
      Self::ApprovalSet => Ok("null".to_string()),
    }
  }

  /// Parse a payload produced by [`Response::encode`] for `endpoint`.
  ///
  /// A `null` list decodes as empty.
  pub fn decode(endpoint: Endpoint, payload: &str) -> serde_json::Result<Self> {
    Ok(match endpoint {
      Endpoint::Employees => Self::Employees(
        serde_json::from_str::<Option<Vec<Employee>>>(payload)?.unwrap_or_default(),
      ),
      Endpoint::PaginatedTransactions => Self::PaginatedTransactions(serde_json::from_str(payload)?),
      Endpoint::TransactionsByEmployee => Self::TransactionsByEmployee(
        serde_json::from_str::<Option<Vec<Transaction>>>(payload)?.unwrap_or_default(),
      ),
      Endpoint::SetTransactionApproval => Self::ApprovalSet,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::transaction;

  #[test]
  fn test_endpoint_of_request_and_response_agree() {
    assert_eq!(Request::page(0).endpoint(), Endpoint::PaginatedTransactions);
    assert_eq!(
      Request::by_employee("e1").endpoint(),
      Endpoint::TransactionsByEmployee
    );
    assert_eq!(
      Response::ApprovalSet.endpoint(),
      Request::set_approval("t1", true).endpoint()
    );
  }

  #[test]
  fn test_params_use_wire_names() {
    let params = Request::set_approval("t1", true).params().unwrap();
    assert_eq!(params["transactionId"], "t1");
    assert_eq!(params["value"], true);
    assert_eq!(Request::Employees.params(), None);
  }

  #[test]
  fn test_page_payload_keeps_wrapper_shape() {
    let response = Response::PaginatedTransactions(PaginatedResponse {
      data: vec![transaction("t1", false)],
      next_page: None,
    });

    let payload = response.encode().unwrap();
    let value: Value = serde_json::from_str(&payload).unwrap();
    assert!(value["data"].is_array());
    assert!(value["nextPage"].is_null());

    let decoded = Response::decode(Endpoint::PaginatedTransactions, &payload).unwrap();
    assert_eq!(decoded, response);
  }

  #[test]
  fn test_null_list_decodes_as_empty() {
    let decoded = Response::decode(Endpoint::TransactionsByEmployee, "null").unwrap();
    assert_eq!(decoded, Response::TransactionsByEmployee(Vec::new()));
  }

  #[test]
  fn test_only_transaction_reads_carry_transactions() {
    let carrying: Vec<_> = Endpoint::ALL
      .into_iter()
      .filter(|e| e.carries_transactions())
      .collect();
    assert_eq!(
      carrying,
      vec![
        Endpoint::PaginatedTransactions,
        Endpoint::TransactionsByEmployee
      ]
    );
  }
}
