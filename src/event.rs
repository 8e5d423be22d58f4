//! Line input from stdin, delivered as session events.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Session events
#[derive(Debug, PartialEq, Eq)]
pub enum Event {
  /// One line typed by the user
  Input(String),
  /// Stdin reached end of file or failed
  Closed,
}

/// Event handler that produces events from lines on stdin
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  pub fn new() -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    // Spawn stdin line reader
    tokio::spawn(async move {
      let mut lines = BufReader::new(tokio::io::stdin()).lines();
      loop {
        match lines.next_line().await {
          Ok(Some(line)) => {
            if tx.send(Event::Input(line)).is_err() {
              break;
            }
          }
          Ok(None) | Err(_) => {
            let _ = tx.send(Event::Closed);
            break;
          }
        }
      }
    });

    Self { rx }
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Event {
    self.rx.recv().await.unwrap_or(Event::Closed)
  }
}
