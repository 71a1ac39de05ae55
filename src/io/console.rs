// src/io/console.rs - Coloured terminal output for the CLI and the server

use colored::*;

use crate::codec::{BreakdownRow, TokenSequence};

pub enum ConsoleEvent {
    Info(String),
    Done(String),
    Warn(String),
    Error(String),
    Request {
        method: String,
        path: String,
        status: u16,
        micros: u128,
    },
}

pub struct Console;

impl Console {
    pub fn emit(event: ConsoleEvent) {
        match event {
            ConsoleEvent::Info(msg) => println!("{} {}", "ℹ️".blue(), msg),
            ConsoleEvent::Done(msg) => println!("{} {}", "✅".green(), msg.green()),
            ConsoleEvent::Warn(msg) => eprintln!("{} {}", "⚠️".yellow(), msg.yellow()),
            ConsoleEvent::Error(msg) => eprintln!("{} {}", "❌".red(), msg.red()),
            ConsoleEvent::Request {
                method,
                path,
                status,
                micros,
            } => {
                let code = status.to_string();
                let code = match status {
                    200..=299 => code.green(),
                    400..=499 => code.yellow(),
                    _ => code.red(),
                };
                println!("🌐 {} {} {} ({}µs)", method.bold(), path, code, micros);
            }
        }
    }
}

/// `[  1] [191] [ 63] ...` chips, one per dimension.
pub fn format_tokens(tokens: &TokenSequence) -> String {
    tokens
        .as_slice()
        .iter()
        .map(|t| format!("[{:>3}]", t))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_breakdown(rows: &[BreakdownRow]) -> String {
    let mut out = format!(
        "{:<10} {:>5} {:>10} {:>5} {:>12} {:>10}\n",
        "dim", "unit", "input", "bin", "decoded", "error"
    );
    for row in rows {
        out.push_str(&format!(
            "{:<10} {:>5} {:>10.4} {:>5} {:>12.4} {:>10.4}\n",
            row.dimension.name(),
            row.unit,
            row.input,
            row.bin,
            row.reconstructed,
            row.error
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{breakdown, encode, ContinuousAction};

    #[test]
    fn test_format_tokens() {
        let action = ContinuousAction::from_array([1.0, 0.5, -0.5, 0.0, 90.0, -90.0, 0.0, 1.0]);
        let encoded = encode(&action).unwrap();
        assert_eq!(
            format_tokens(&encoded.tokens),
            "[  1] [191] [ 63] [127] [191] [ 63] [127] [255]"
        );
    }

    #[test]
    fn test_format_breakdown_has_row_per_dimension() {
        let rows = breakdown(&ContinuousAction::default()).unwrap();
        let table = format_breakdown(&rows);
        assert_eq!(table.lines().count(), 9);
        assert!(table.contains("gripper"));
    }
}
