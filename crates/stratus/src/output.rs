use colored::Colorize;
use serde::Serialize;

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a resource state, or a notice when it no longer exists
pub fn print_state<T: Serialize>(state: Option<&T>, what: &str) -> anyhow::Result<()> {
    match state {
        Some(state) => print_json(state),
        None => {
            eprintln!("{} {}", "⚠".yellow(), format!("{} not found", what).yellow());
            Ok(())
        }
    }
}

pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green(), message);
}
