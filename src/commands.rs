/// Available commands, parsing and autocomplete logic

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub usage: &'static str,
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "all",
    aliases: &["a", "list"],
    usage: "all",
    description: "Show all transactions",
  },
  Command {
    name: "employee",
    aliases: &["e", "emp"],
    usage: "employee <id>",
    description: "Show one employee's transactions",
  },
  Command {
    name: "more",
    aliases: &["m", "next"],
    usage: "more",
    description: "Load the next page of transactions",
  },
  Command {
    name: "approve",
    aliases: &["ap", "y"],
    usage: "approve <transaction id>",
    description: "Approve a transaction",
  },
  Command {
    name: "reject",
    aliases: &["r", "n"],
    usage: "reject <transaction id>",
    description: "Clear a transaction's approval",
  },
  Command {
    name: "toggle",
    aliases: &["t"],
    usage: "toggle <transaction id>",
    description: "Flip a transaction's approval",
  },
  Command {
    name: "employees",
    aliases: &["who"],
    usage: "employees",
    description: "List employees",
  },
  Command {
    name: "cache",
    aliases: &["c"],
    usage: "cache [clear|refresh]",
    description: "Show the request cache, clear it, or drop cached reads",
  },
  Command {
    name: "stats",
    aliases: &["s"],
    usage: "stats",
    description: "Show transport call counts",
  },
  Command {
    name: "help",
    aliases: &["h", "?"],
    usage: "help",
    description: "List commands",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    usage: "quit",
    description: "Exit txview",
  },
];

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  All,
  Employee(String),
  More,
  SetApproval { transaction_id: String, approved: bool },
  Toggle(String),
  Employees,
  CacheStats,
  CacheClear,
  CacheRefresh,
  Stats,
  Help,
  Quit,
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0)); // Highest priority
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
      continue;
    }

    // Fuzzy match (contains)
    if cmd.name.contains(&input_lower) {
      matches.push((cmd, 4));
      continue;
    }

    // Fuzzy match on alias
    if cmd.aliases.iter().any(|a| a.contains(&input_lower)) {
      matches.push((cmd, 5));
    }
  }

  // Sort by priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Resolve a command word: exact or prefix matches only, fuzzy ones are
/// offered as suggestions in the error.
fn resolve(word: &str) -> Result<&'static Command, String> {
  let word_lower = word.to_lowercase();
  let suggestions = get_suggestions(&word_lower);

  match suggestions.first() {
    Some(cmd)
      if cmd.name.starts_with(&word_lower)
        || cmd.aliases.iter().any(|a| a.starts_with(&word_lower)) =>
    {
      Ok(*cmd)
    }
    Some(_) => {
      let names: Vec<_> = suggestions.iter().map(|c| c.name).collect();
      Err(format!(
        "Unknown command '{}'. Did you mean: {}?",
        word,
        names.join(", ")
      ))
    }
    None => Err(format!("Unknown command '{}'. Type 'help' for commands.", word)),
  }
}

/// Parse one input line into an action
pub fn parse(input: &str) -> Result<Action, String> {
  let mut parts = input.split_whitespace();
  let Some(word) = parts.next() else {
    return Err("Empty command".to_string());
  };
  let cmd = resolve(word)?;
  let argument = parts.next().map(String::from);
  let missing = || format!("Usage: {}", cmd.usage);

  let action = match cmd.name {
    "all" => Action::All,
    "employee" => Action::Employee(argument.ok_or_else(missing)?),
    "more" => Action::More,
    "approve" => Action::SetApproval {
      transaction_id: argument.ok_or_else(missing)?,
      approved: true,
    },
    "reject" => Action::SetApproval {
      transaction_id: argument.ok_or_else(missing)?,
      approved: false,
    },
    "toggle" => Action::Toggle(argument.ok_or_else(missing)?),
    "employees" => Action::Employees,
    "cache" => match argument.as_deref() {
      None => Action::CacheStats,
      Some("clear") => Action::CacheClear,
      Some("refresh") => Action::CacheRefresh,
      Some(_) => return Err(missing()),
    },
    "stats" => Action::Stats,
    "help" => Action::Help,
    "quit" => Action::Quit,
    _ => return Err(format!("Unknown command '{}'", word)),
  };

  Ok(action)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("employees");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "employees");
  }

  #[test]
  fn test_alias_beats_prefix() {
    let suggestions = get_suggestions("a");
    assert_eq!(suggestions[0].name, "all");
    assert_eq!(get_suggestions("e")[0].name, "employee");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("ject");
    assert!(!suggestions.is_empty());
    assert_eq!(suggestions[0].name, "reject");
  }

  #[test]
  fn test_parse_with_arguments() {
    assert_eq!(parse("employee e2"), Ok(Action::Employee("e2".to_string())));
    assert_eq!(
      parse("approve txn-001"),
      Ok(Action::SetApproval {
        transaction_id: "txn-001".to_string(),
        approved: true,
      })
    );
    assert_eq!(
      parse("r txn-002"),
      Ok(Action::SetApproval {
        transaction_id: "txn-002".to_string(),
        approved: false,
      })
    );
    assert_eq!(parse("cache clear"), Ok(Action::CacheClear));
    assert_eq!(parse("c refresh"), Ok(Action::CacheRefresh));
  }

  #[test]
  fn test_parse_by_prefix() {
    assert_eq!(parse("mo"), Ok(Action::More));
    assert_eq!(parse("QUIT"), Ok(Action::Quit));
  }

  #[test]
  fn test_missing_argument_reports_usage() {
    assert_eq!(parse("toggle"), Err("Usage: toggle <transaction id>".to_string()));
    assert!(parse("cache purge").is_err());
  }

  #[test]
  fn test_unknown_command_suggests() {
    let err = parse("ject x").unwrap_err();
    assert!(err.contains("reject"));
    assert!(parse("zzz").is_err());
    assert!(parse("   ").is_err());
  }
}
