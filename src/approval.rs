//! Optimistic approval toggling with rollback.

use tracing::{debug, warn};

use crate::api::types::Transaction;
use crate::api::FetchGateway;
use crate::error::RemoteError;

/// Copy of `transactions` with `transaction_id`'s approval set to `approved`.
pub fn with_approval(transactions: &[Transaction], transaction_id: &str, approved: bool) -> Vec<Transaction> {
  transactions
    .iter()
    .map(|t| {
      if t.id == transaction_id {
        Transaction {
          approved,
          ..t.clone()
        }
      } else {
        t.clone()
      }
    })
    .collect()
}

/// Applies approval changes optimistically and rolls them back on failure.
#[derive(Clone)]
pub struct ApprovalMutator {
  gateway: FetchGateway,
}

impl ApprovalMutator {
  pub fn new(gateway: FetchGateway) -> Self {
    Self { gateway }
  }

  /// Set `transaction_id`'s approval to `new_value`.
  ///
  /// 1. Publishes `current` with the change applied, before any remote call.
  /// 2. Issues the uncached approval write; on success the gateway records
  ///    the value in the approval overlay and the optimistic list stands.
  /// 3. On failure publishes `current` with the transaction's prior approval
  ///    value restored, then returns the error.
  ///
  /// The prior value is read from `current`, so a rollback restores what was
  /// actually shown rather than assuming the change was a toggle.
  pub async fn set_approval<F>(
    &self,
    transaction_id: &str,
    new_value: bool,
    current: &[Transaction],
    mut publish: F,
  ) -> Result<(), RemoteError>
  where
    F: FnMut(Vec<Transaction>),
  {
    let prior = current
      .iter()
      .find(|t| t.id == transaction_id)
      .map(|t| t.approved)
      .unwrap_or(!new_value);

    debug!(transaction_id, new_value, "publishing optimistic approval");
    publish(with_approval(current, transaction_id, new_value));

    match self
      .gateway
      .set_transaction_approval(transaction_id, new_value)
      .await
    {
      Ok(()) => Ok(()),
      Err(e) => {
        warn!(transaction_id, error = %e, restored = prior, "approval write failed, rolling back");
        publish(with_approval(current, transaction_id, prior));
        Err(e)
      }
    }
  }
}
