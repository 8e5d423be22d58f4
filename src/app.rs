//! Interactive session over the view coordinator.

use color_eyre::Result;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::types::Transaction;
use crate::api::{Endpoint, FetchGateway, FixtureTransport};
use crate::cache::RequestCache;
use crate::commands::{self, Action, COMMANDS};
use crate::config::Config;
use crate::coordinator::{ActiveView, ViewCoordinator};
use crate::error::RemoteError;
use crate::event::{Event, EventHandler};

/// Interactive session state
pub struct App {
  coordinator: ViewCoordinator,
  /// Kept for call statistics; the gateway holds the same transport
  transport: Arc<FixtureTransport>,
  config: Config,
  log_path: Option<PathBuf>,
  should_quit: bool,
}

impl App {
  /// Build a session: one request cache and one gateway for its lifetime.
  pub fn new(config: Config, log_path: Option<PathBuf>) -> Result<Self> {
    let transport = Arc::new(FixtureTransport::from_config(&config.transport)?);
    let gateway = FetchGateway::new(transport.clone(), RequestCache::new());

    Ok(Self {
      coordinator: ViewCoordinator::new(gateway),
      transport,
      config,
      log_path,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    println!("txview - type 'help' for commands");
    if let Some(path) = &self.log_path {
      println!("logging to {}", path.display());
    }

    // Initial data load
    let initial = self.load_initial_data().await;
    println!("{}", initial);

    let mut events = EventHandler::new();

    // Main loop
    while !self.should_quit() {
      print!("> ");
      std::io::stdout().flush()?;

      match events.next().await {
        Event::Input(line) => {
          if let Some(output) = self.handle_line(&line).await {
            println!("{}", output);
          }
        }
        Event::Closed => self.should_quit = true,
      }
    }

    info!("session ended");
    Ok(())
  }

  async fn load_initial_data(&mut self) -> String {
    // The filter needs employee names whichever view starts active.
    if let Err(e) = self.coordinator.load_employees().await {
      warn!(error = %e, "failed to load employees");
    }

    let action = match self.config.default_employee.clone() {
      Some(id) => Action::Employee(id),
      None => Action::All,
    };
    self.execute(action).await
  }

  /// Handle one input line, returning text to show (if any).
  pub async fn handle_line(&mut self, line: &str) -> Option<String> {
    if line.trim().is_empty() {
      return None;
    }

    match commands::parse(line) {
      Ok(action) => Some(self.execute(action).await),
      Err(msg) => Some(msg),
    }
  }

  pub async fn execute(&mut self, action: Action) -> String {
    match self.dispatch(action).await {
      Ok(output) => output,
      Err(e) => {
        warn!(error = %e, "command failed");
        let mut output = format!("Error: {}\n", e);
        output.push_str(&self.render_transactions());
        output
      }
    }
  }

  async fn dispatch(&mut self, action: Action) -> Result<String, RemoteError> {
    match action {
      Action::All => {
        self.coordinator.select(None).await?;
        Ok(self.render_transactions())
      }
      Action::Employee(id) => {
        self.coordinator.select(Some(&id)).await?;
        Ok(self.render_transactions())
      }
      Action::More => {
        if !self.coordinator.can_load_more() {
          return Ok("No more transactions to load.".to_string());
        }
        self.coordinator.load_more().await?;
        Ok(self.render_transactions())
      }
      Action::SetApproval {
        transaction_id,
        approved,
      } => {
        if !self.is_visible(&transaction_id) {
          return Ok(format!("No visible transaction '{}'.", transaction_id));
        }
        self
          .coordinator
          .set_approval(&transaction_id, approved)
          .await?;
        Ok(self.render_transactions())
      }
      Action::Toggle(transaction_id) => {
        match self.coordinator.toggle_approval(&transaction_id).await? {
          Some(_) => Ok(self.render_transactions()),
          None => Ok(format!("No visible transaction '{}'.", transaction_id)),
        }
      }
      Action::Employees => Ok(self.render_employees()),
      Action::CacheStats => Ok(self.render_cache()),
      Action::CacheClear => {
        self.coordinator.gateway().clear_cache();
        Ok("Cache cleared.".to_string())
      }
      Action::CacheRefresh => {
        // Overlay entries survive so approvals still reconcile.
        self.coordinator.gateway().clear_cache_by_endpoint(&[
          Endpoint::Employees,
          Endpoint::PaginatedTransactions,
          Endpoint::TransactionsByEmployee,
        ]);
        Ok("Cached reads dropped.".to_string())
      }
      Action::Stats => Ok(self.render_stats()),
      Action::Help => Ok(render_help()),
      Action::Quit => {
        self.should_quit = true;
        Ok("Bye.".to_string())
      }
    }
  }

  fn is_visible(&self, transaction_id: &str) -> bool {
    self
      .coordinator
      .transactions()
      .iter()
      .any(|t| t.id == transaction_id)
  }

  fn render_transactions(&self) -> String {
    let mut output = match self.coordinator.active_view() {
      ActiveView::AllTransactions => "All transactions\n".to_string(),
      ActiveView::ByEmployee(id) => match self.coordinator.employee(id) {
        Some(employee) => format!("Transactions for {}\n", employee.display_name()),
        None => format!("Transactions for employee {}\n", id),
      },
    };

    let transactions = self.coordinator.transactions();
    if transactions.is_empty() {
      output.push_str("  (no transactions)\n");
    }
    for transaction in transactions {
      let _ = writeln!(output, "  {}", render_transaction(transaction));
    }

    if self.coordinator.can_load_more() {
      let page = self.coordinator.paginated().next_page().unwrap_or_default();
      let _ = write!(output, "-- 'more' to load page {} --", page);
    }
    output.trim_end().to_string()
  }

  fn render_employees(&self) -> String {
    let employees = self.coordinator.employees();
    if employees.is_empty() {
      return "No employees loaded. Use 'all' first.".to_string();
    }

    employees
      .iter()
      .map(|e| format!("  {:<6} {}", e.id, e.display_name()))
      .collect::<Vec<_>>()
      .join("\n")
  }

  fn render_cache(&self) -> String {
    let gateway = self.coordinator.gateway();
    format!(
      "{} cached entries, {} approval overrides",
      gateway.cache().len(),
      gateway.overlay().entries().len()
    )
  }

  fn render_stats(&self) -> String {
    Endpoint::ALL
      .iter()
      .map(|e| format!("  {:<24} {}", e.as_str(), self.transport.call_count(*e)))
      .collect::<Vec<_>>()
      .join("\n")
  }

  pub fn should_quit(&self) -> bool {
    self.should_quit
  }
}

fn render_transaction(transaction: &Transaction) -> String {
  format!(
    "[{}] {:<8} {:<18} {:<22} {:>10.2}  {}",
    if transaction.approved { "x" } else { " " },
    transaction.id,
    transaction.employee.display_name(),
    transaction.merchant,
    transaction.amount,
    transaction.date
  )
}

fn render_help() -> String {
  COMMANDS
    .iter()
    .map(|c| format!("  {:<26} {}", c.usage, c.description))
    .collect::<Vec<_>>()
    .join("\n")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn app() -> App {
    let mut config = Config::default();
    config.transport.latency_ms = 0;
    config
      .transport
      .failing_transactions
      .insert("txn-002".to_string());
    App::new(config, None).unwrap()
  }

  #[tokio::test]
  async fn test_initial_load_shows_first_page() {
    let mut app = app();
    let output = app.load_initial_data().await;

    assert!(output.starts_with("All transactions"));
    assert!(output.contains("txn-001"));
    assert!(output.contains("txn-005"));
    assert!(!output.contains("txn-006"));
    assert!(output.contains("'more'"));
  }

  #[tokio::test]
  async fn test_startup_employee_loads_directory() {
    let mut config = Config::default();
    config.transport.latency_ms = 0;
    config.default_employee = Some("e3".to_string());
    let mut app = App::new(config, None).unwrap();

    let output = app.load_initial_data().await;

    assert!(output.starts_with("Transactions for Robert Williams"));
    assert!(output.contains("txn-003"));
    let output = app.handle_line("employees").await.unwrap();
    assert!(output.contains("Patricia Brown"));
  }

  #[tokio::test]
  async fn test_session_commands() {
    let mut app = app();
    app.handle_line("all").await;

    let output = app.handle_line("more").await.unwrap();
    assert!(output.contains("txn-010"));

    let output = app.handle_line("approve txn-003").await.unwrap();
    assert!(output.contains("[x] txn-003"));

    let output = app.handle_line("employee e3").await.unwrap();
    assert!(output.starts_with("Transactions for Robert Williams"));
    assert!(output.contains("[x] txn-003"));
    assert!(!output.contains("'more'"));

    let output = app.handle_line("stats").await.unwrap();
    assert!(output.contains("setTransactionApproval"));

    assert_eq!(app.handle_line("   ").await, None);
    app.handle_line("quit").await;
    assert!(app.should_quit());
  }

  #[tokio::test]
  async fn test_failed_approval_is_reported_and_reverted() {
    let mut app = app();
    app.handle_line("all").await;

    let output = app.handle_line("approve txn-002").await.unwrap();

    assert!(output.starts_with("Error:"));
    assert!(output.contains("[ ] txn-002"));
  }

  #[tokio::test]
  async fn test_unknown_transaction_is_not_sent() {
    let mut app = app();
    app.handle_line("all").await;

    let output = app.handle_line("toggle txn-999").await.unwrap();

    assert_eq!(output, "No visible transaction 'txn-999'.");
    assert_eq!(app.transport.call_count(Endpoint::SetTransactionApproval), 0);
  }

  #[tokio::test]
  async fn test_cache_commands() {
    let mut app = app();
    app.handle_line("all").await;

    let output = app.handle_line("cache").await.unwrap();
    assert!(output.starts_with("2 cached entries"));

    app.handle_line("approve txn-003").await;
    app.handle_line("cache refresh").await;
    let output = app.handle_line("cache").await.unwrap();
    assert_eq!(output, "1 cached entries, 1 approval overrides");

    let output = app.handle_line("all").await.unwrap();
    assert!(output.contains("[x] txn-003"));
    assert_eq!(app.transport.call_count(Endpoint::PaginatedTransactions), 1);

    app.handle_line("cache clear").await;
    let output = app.handle_line("cache").await.unwrap();
    assert!(output.starts_with("0 cached entries"));
  }
}
