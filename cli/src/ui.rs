use colored::Colorize;
use corrections::{ItemReport, Outcome};
use std::io::{self, Write};

/// Print a status message with a spinner-like indicator
pub fn status_message(message: &str) {
    println!("{} {} ... ", "⏳".yellow(), message.bright_white());
    let _ = io::stdout().flush();
}

/// Print a success message
pub fn success_message(message: &str) {
    println!("{} {}", "✅".green(), message.green());
}

/// Print a warning message
pub fn warning_message(message: &str) {
    println!("{} {}", "⚠️ ".yellow(), message.yellow());
}

/// Print an error message
pub fn error_message(message: &str) {
    eprintln!("{} {}", "❌".red(), message.red().bold());
}

/// Print a section header to separate logical sections of output
pub fn section_header(title: &str) {
    println!("\n{}", format!("==== {} ====", title).cyan().bold());
}

/// Print a simple informational message
pub fn info_message(message: &str) {
    println!("{} {}", "ℹ️ ".blue(), message.blue());
}

/// Print one labelled count of the run summary
pub fn summary_line(label: &str, value: usize) {
    println!("  {:<18} {}", label, value.to_string().bold());
}

/// Print the outcome of a single correction
pub fn item_outcome(item: &ItemReport, total: usize, verbose: bool) {
    let prefix = format!("[{}/{}]", item.index + 1, total);
    match &item.outcome {
        Outcome::Success => {
            success_message(&format!("{prefix} added correction for package: {}", item.label))
        }
        Outcome::DecodeMismatch { detail } => {
            success_message(&format!("{prefix} added correction for package: {}", item.label));
            if verbose {
                info_message(&format!("response did not match the declared shape: {detail}"));
            }
        }
        Outcome::HttpFailure { .. } | Outcome::TransportFailure { .. } => error_message(&format!(
            "{prefix} failed to add correction for package {}: {}",
            item.label, item.outcome
        )),
    }
}
