//! Output formatting

use clap::ValueEnum;
use colored::Colorize;
use formwork_core::{Notifier, Severity};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Print a single value; tables fall back to pretty JSON
    pub fn print<T: Serialize>(&self, data: &T) {
        match self {
            OutputFormat::Json | OutputFormat::Table => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
            OutputFormat::Yaml => {
                println!("{}", serde_yaml::to_string(data).unwrap_or_default());
            }
        }
    }

    /// Print a list of rows
    pub fn print_rows<R: Serialize + Tabled>(&self, rows: &[R]) {
        match self {
            OutputFormat::Table => {
                if rows.is_empty() {
                    println!("{}", "(none)".dimmed());
                } else {
                    println!("{}", Table::new(rows).with(Style::rounded()));
                }
            }
            _ => self.print(&rows),
        }
    }
}

/// Prints notifications to stderr, coloured by severity
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        let line = match severity {
            Severity::Success => message.green(),
            Severity::Error => message.red().bold(),
            Severity::Warning => message.yellow(),
            Severity::Info => message.cyan(),
        };
        eprintln!("{}", line);
    }
}
